//! Session escrow contract types and interfaces.
//!
//! This module defines the `SessionEscrowV1` booking system, where a guest's payment is locked
//! against a host's slot until an oracle attests how the session concluded and the dispute
//! window elapses.

use crate::timing::{OutcomeKind, SlotSchedule};
use ISessionEscrow::ISessionEscrowInstance;
use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
    sol,
};

sol! {
    /// Lifecycle of a bookable slot.
    #[derive(Debug, PartialEq, Eq)]
    enum SlotStatus {
        /// Slot is published and can be booked.
        Open,
        /// A guest has booked the slot.
        Booked,
        /// The slot was withdrawn or the booking cancelled.
        Cancelled,
        /// The booking against this slot has been finalized.
        Settled
    }

    /// Lifecycle of a booking.
    ///
    /// `None -> Booked -> {Cancelled | Attested}`, then
    /// `Attested -> {Disputed -> Resolved | Finalized}`.
    #[derive(Debug, PartialEq, Eq)]
    enum BookingStatus {
        /// Default null status - booking does not exist.
        None,
        /// Funds are escrowed and the session is pending.
        Booked,
        /// Cancelled before the slot locked.
        Cancelled,
        /// An oracle attested the outcome, dispute window is open.
        Attested,
        /// The attestation was challenged.
        Disputed,
        /// The dispute was resolved.
        Resolved,
        /// Funds were released after the dispute window.
        Finalized
    }

    /// Outcome codes attested by the oracle.
    #[derive(Debug, PartialEq, Eq)]
    enum Outcome {
        /// No outcome attested yet.
        None,
        /// Both parties met for at least the minimum overlap.
        Completed,
        /// The host did not show up.
        NoShowHost,
        /// The guest did not show up.
        NoShowGuest,
        /// Host cancelled before the cutoff.
        CancelledByHost,
        /// Guest cancelled before the cutoff.
        CancelledByGuest
    }

    /// A host-defined bookable time period.
    #[derive(Debug, PartialEq, Eq)]
    struct Slot {
        /// Address owning the slot. Zero when the slot does not exist.
        address host;
        /// Scheduled start, unix seconds.
        uint64 startTime;
        /// Nominal session length in minutes.
        uint32 durationMins;
        /// Price in the smallest unit of the payment token.
        uint256 price;
        /// Delay after start before a no-show becomes attestable.
        uint32 graceMins;
        /// Minimum joint presence for a session to count as completed.
        uint32 minOverlapMins;
        /// Minutes before start after which cancellation is no longer accepted.
        uint32 cancelCutoffMins;
        /// Current slot status.
        SlotStatus status;
    }

    /// A guest's reservation against a [`Slot`].
    #[derive(Debug, PartialEq, Eq)]
    struct Booking {
        /// Owning slot.
        uint256 slotId;
        /// Address of the guest.
        address guest;
        /// Escrowed amount.
        uint256 amount;
        /// Current booking status.
        BookingStatus status;
        /// Attested outcome, meaningful once the status is at least `Attested`.
        Outcome oracleOutcome;
        /// Commitment to the off-chain presence metrics.
        bytes32 metricsHash;
        /// When the outcome was attested.
        uint64 attestedAt;
        /// When the booking can be finalized if left undisputed.
        uint64 finalizableAt;
        /// Address that raised a dispute, if any.
        address challenger;
        /// Bond posted by the challenger.
        uint256 bondAmount;
        /// When the dispute was raised.
        uint64 disputedAt;
    }

    #[sol(rpc)]
    #[derive(Debug)]
    contract ISessionEscrow {
        /// Emitted when an oracle attests a booking outcome.
        event BookingAttested(uint256 indexed bookingId, uint8 outcome, bytes32 metricsHash);

        /// Returns the slot with the given id. Unknown slots have a zero host.
        function getSlot(uint256 slotId) external view returns (Slot memory);

        /// Returns the booking with the given id. Unknown bookings have status `None`.
        function getBooking(uint256 bookingId) external view returns (Booking memory);

        /// Attests the outcome of a booked session.
        ///
        /// Reverts unless the booking is `Booked`, the caller is the oracle and the current
        /// block timestamp lies within the window for `outcome`.
        function attest(uint256 bookingId, uint8 outcome, bytes32 metricsHash) external;
    }
}

impl Slot {
    /// Whether the slot is unset on-chain, i.e. its host is the zero address.
    pub fn is_unset(&self) -> bool {
        self.host == Address::ZERO
    }

    /// The schedule parameters the attestation windows are derived from.
    pub fn schedule(&self) -> SlotSchedule {
        SlotSchedule {
            start_time: self.startTime,
            duration_mins: self.durationMins.into(),
            grace_mins: self.graceMins.into(),
            min_overlap_mins: self.minOverlapMins.into(),
        }
    }
}

impl Booking {
    /// Whether the booking exists on-chain.
    pub fn exists(&self) -> bool {
        self.status != BookingStatus::None
    }
}

impl BookingStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Resolved | Self::Finalized)
    }

    /// Whether an outcome has already been attested for the booking.
    ///
    /// This covers the dispute branch as well, since a disputed booking was attested first.
    pub fn is_attested(&self) -> bool {
        matches!(self, Self::Attested | Self::Disputed | Self::Resolved | Self::Finalized)
    }
}

impl From<OutcomeKind> for Outcome {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Completed => Self::Completed,
            OutcomeKind::NoShowHost => Self::NoShowHost,
            OutcomeKind::NoShowGuest => Self::NoShowGuest,
        }
    }
}

/// Session escrow contract instance.
#[derive(Debug)]
pub struct SessionEscrow<P> {
    inner: ISessionEscrowInstance<P>,
}

impl<P: Provider> SessionEscrow<P> {
    /// Create a new [`SessionEscrow`] instance.
    pub fn new(address: Address, provider: P) -> Self {
        Self { inner: ISessionEscrow::new(address, provider) }
    }

    /// Address of the escrow contract.
    pub fn address(&self) -> Address {
        *self.inner.address()
    }

    /// Reads the slot with the given id.
    pub async fn slot(&self, slot_id: U256) -> alloy::contract::Result<Slot> {
        self.inner.getSlot(slot_id).call().await
    }

    /// Reads the booking with the given id.
    pub async fn booking(&self, booking_id: U256) -> alloy::contract::Result<Booking> {
        self.inner.getBooking(booking_id).call().await
    }
}

/// Prepares an [`ISessionEscrow::attestCall`].
pub fn attest_call(
    booking_id: U256,
    outcome: Outcome,
    metrics_hash: B256,
) -> ISessionEscrow::attestCall {
    ISessionEscrow::attestCall {
        bookingId: booking_id,
        outcome: u8::from(outcome),
        metricsHash: metrics_hash,
    }
}
