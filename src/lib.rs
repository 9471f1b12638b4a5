//! # Session Attestor
//!
//! Attestation timing rules and a client for the `SessionEscrowV1` booking escrow.
//!
//! - [`timing`] computes the windows in which each outcome may be attested and classifies
//!   timing failures for a retrying scheduler.
//! - [`idempotency`] recognizes `attest` reverts that mean the booking was already attested.
//! - [`escrow`] reads slots and bookings and submits attestations, over JSON-RPC or fixtures.
//! - [`attestation`] runs a single attestation attempt end to end.

pub mod attestation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod escrow;
pub mod idempotency;
pub mod metrics;
pub mod timing;
pub mod types;
pub mod version;
