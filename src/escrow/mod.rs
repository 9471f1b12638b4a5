//! Session escrow access.
//!
//! [`EscrowApi`] is the capability to read slots and bookings and to submit attestations. It has
//! two backends, selected when the [`EscrowClient`] is constructed:
//!
//! - [`RpcEscrow`] talks to a deployed `SessionEscrowV1` contract over JSON-RPC.
//! - [`FixtureEscrow`] serves fixed values without any I/O, for local runs and tests.
//!
//! The client never lets a failure escape as a panic: reads resolve to `None` when the entity is
//! absent or could not be read, and writes return an [`EscrowError`].

mod api;
pub use api::EscrowApi;

mod fixture;
pub use fixture::{FixtureEscrow, fixture_booking, fixture_slot};

mod rpc;
pub use rpc::{EscrowEndpoint, RpcEscrow, parse_oracle_key};

use crate::{
    error::EscrowError,
    metrics::EscrowMetrics,
    types::{Booking, Outcome, Slot},
};
use alloy::{
    primitives::{B256, U256},
    signers::local::PrivateKeySigner,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Handle to a session escrow backend.
#[derive(Debug, Clone)]
pub struct EscrowClient {
    inner: Arc<dyn EscrowApi>,
    metrics: Arc<EscrowMetrics>,
}

impl EscrowClient {
    /// Create an [`EscrowClient`] over an arbitrary backend.
    pub fn new(inner: Arc<dyn EscrowApi>) -> Self {
        Self { inner, metrics: Arc::new(EscrowMetrics::default()) }
    }

    /// Create an [`EscrowClient`] talking to a deployed contract.
    ///
    /// Without an oracle key the client can read, but attestations fail with
    /// [`EscrowError::MissingOracleKey`].
    pub fn rpc(endpoint: EscrowEndpoint, oracle: Option<PrivateKeySigner>) -> Self {
        Self::new(Arc::new(RpcEscrow::new(endpoint, oracle)))
    }

    /// Create an [`EscrowClient`] with the fixture backend. Performs no network I/O.
    pub fn fixture() -> Self {
        Self::new(Arc::new(FixtureEscrow::default()))
    }

    /// Returns the slot, or `None` if it is unset on-chain or could not be read.
    ///
    /// `None` means "could not determine", callers must re-check before acting on it.
    #[instrument(skip(self), fields(backend = self.inner.name()))]
    pub async fn get_slot(&self, slot_id: U256) -> Option<Slot> {
        self.metrics.reads.increment(1);
        match self.inner.slot(slot_id).await {
            Ok(slot) if slot.is_unset() => {
                debug!("Slot is unset");
                None
            }
            Ok(slot) => Some(slot),
            Err(err) => {
                self.metrics.read_failures.increment(1);
                warn!(%err, "Failed to read slot");
                None
            }
        }
    }

    /// Returns the booking, or `None` if it does not exist on-chain or could not be read.
    #[instrument(skip(self), fields(backend = self.inner.name()))]
    pub async fn get_booking(&self, booking_id: U256) -> Option<Booking> {
        self.metrics.reads.increment(1);
        match self.inner.booking(booking_id).await {
            Ok(booking) if !booking.exists() => {
                debug!("Booking does not exist");
                None
            }
            Ok(booking) => Some(booking),
            Err(err) => {
                self.metrics.read_failures.increment(1);
                warn!(%err, "Failed to read booking");
                None
            }
        }
    }

    /// Signs and submits an attestation, returning the hash of the mined transaction.
    ///
    /// Nothing is retried. On failure, use [`EscrowError::is_idempotent_attestation`] to detect a
    /// booking that was already attested.
    #[instrument(skip(self), fields(backend = self.inner.name()))]
    pub async fn attest_outcome(
        &self,
        booking_id: U256,
        outcome: Outcome,
        metrics_hash: B256,
    ) -> Result<B256, EscrowError> {
        match self.inner.attest(booking_id, outcome, metrics_hash).await {
            Ok(tx_hash) => {
                self.metrics.attestations_submitted.increment(1);
                info!(%tx_hash, "Submitted attestation");
                Ok(tx_hash)
            }
            Err(err) => {
                self.metrics.attestation_failures.increment(1);
                if err.is_idempotent_attestation() {
                    self.metrics.idempotent_attestations.increment(1);
                    info!(%err, "Booking already attested");
                } else {
                    warn!(%err, "Failed to submit attestation");
                }
                Err(err)
            }
        }
    }
}
