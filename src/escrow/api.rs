//! Session escrow api.

use crate::{
    error::EscrowError,
    types::{Booking, Outcome, Slot},
};
use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use std::fmt::Debug;

/// Access to a `SessionEscrowV1` contract.
///
/// Implementations return raw on-chain values: an unknown slot has a zero host and an unknown
/// booking has status `None`. Absence handling is done by [`EscrowClient`](super::EscrowClient).
#[async_trait]
pub trait EscrowApi: Debug + Send + Sync {
    /// Short name of the backend, used in logs.
    fn name(&self) -> &'static str;

    /// Reads a slot.
    async fn slot(&self, slot_id: U256) -> Result<Slot, EscrowError>;

    /// Reads a booking.
    async fn booking(&self, booking_id: U256) -> Result<Booking, EscrowError>;

    /// Signs and submits `attest(bookingId, outcome, metricsHash)`.
    ///
    /// Returns the transaction hash once the transaction is mined successfully. A mined revert is
    /// [`EscrowError::Reverted`].
    async fn attest(
        &self,
        booking_id: U256,
        outcome: Outcome,
        metrics_hash: B256,
    ) -> Result<B256, EscrowError>;
}
