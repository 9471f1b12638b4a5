//! Fixture-backed session escrow. For local runs and testing only.

use super::EscrowApi;
use crate::{
    constants::FIXTURE_ATTEST_TX_HASH,
    error::EscrowError,
    types::{Booking, BookingStatus, Outcome, Slot, SlotStatus},
};
use alloy::primitives::{Address, B256, U256, address};
use async_trait::async_trait;
use tracing::debug;

/// The fixed slot served by [`FixtureEscrow::default`].
///
/// A 30 minute session starting at `1_700_000_000` with a 5 minute grace period and a 10 minute
/// minimum overlap.
pub fn fixture_slot() -> Slot {
    Slot {
        host: address!("0x1111111111111111111111111111111111111111"),
        startTime: 1_700_000_000,
        durationMins: 30,
        price: U256::from(10_000_000u64),
        graceMins: 5,
        minOverlapMins: 10,
        cancelCutoffMins: 60,
        status: SlotStatus::Booked,
    }
}

/// The fixed booking served by [`FixtureEscrow::default`], booked against [`fixture_slot`].
pub fn fixture_booking() -> Booking {
    Booking {
        slotId: U256::from(1),
        guest: address!("0x2222222222222222222222222222222222222222"),
        amount: U256::from(10_000_000u64),
        status: BookingStatus::Booked,
        oracleOutcome: Outcome::None,
        metricsHash: B256::ZERO,
        attestedAt: 0,
        finalizableAt: 0,
        challenger: Address::ZERO,
        bondAmount: U256::ZERO,
        disputedAt: 0,
    }
}

/// [`EscrowApi`] implementation serving fixed values regardless of the requested id.
///
/// Attestations are not recorded and always return [`FIXTURE_ATTEST_TX_HASH`].
#[derive(Debug, Clone)]
pub struct FixtureEscrow {
    slot: Slot,
    booking: Booking,
}

impl Default for FixtureEscrow {
    fn default() -> Self {
        Self { slot: fixture_slot(), booking: fixture_booking() }
    }
}

impl FixtureEscrow {
    /// Serve the given slot instead.
    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = slot;
        self
    }

    /// Serve the given booking instead.
    pub fn with_booking(mut self, booking: Booking) -> Self {
        self.booking = booking;
        self
    }
}

#[async_trait]
impl EscrowApi for FixtureEscrow {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn slot(&self, _slot_id: U256) -> Result<Slot, EscrowError> {
        Ok(self.slot.clone())
    }

    async fn booking(&self, _booking_id: U256) -> Result<Booking, EscrowError> {
        Ok(self.booking.clone())
    }

    async fn attest(
        &self,
        booking_id: U256,
        outcome: Outcome,
        metrics_hash: B256,
    ) -> Result<B256, EscrowError> {
        debug!(%booking_id, ?outcome, %metrics_hash, "Fixture attestation, nothing sent");
        Ok(FIXTURE_ATTEST_TX_HASH)
    }
}
