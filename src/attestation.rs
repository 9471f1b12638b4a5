//! A single attestation attempt for a booking.
//!
//! The [`Attestor`] strings the pieces together in the order a scheduler needs them: read the
//! booking and its slot, check the window for the outcome, commit to the metrics and submit. The
//! result tells the scheduler whether to retry, reschedule or give up. Attempts for the same
//! booking must be serialized by the caller.

use crate::{
    error::EscrowError,
    escrow::EscrowClient,
    timing::{
        AttestationWindows, OutcomeKind, SchedulerTiming, TimingError,
        validate_attestation_window,
    },
    types::{AttestMetrics, BookingStatus, compute_metrics_hash},
};
use alloy::primitives::{B256, U256};
use tracing::{info, instrument, warn};

/// Request to attest the outcome of a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRequest {
    /// Booking to attest.
    pub booking_id: U256,
    /// Outcome derived from the presence metrics.
    pub outcome: OutcomeKind,
    /// Presence metrics justifying the outcome.
    pub metrics: AttestMetrics,
    /// Current time, unix seconds.
    pub now: u64,
}

/// Result of an attestation attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The attestation transaction was mined without reverting.
    Submitted {
        /// Hash of the attestation transaction.
        tx_hash: B256,
        /// The metrics commitment that was attested.
        metrics_hash: B256,
    },
    /// The booking was already attested, either before this attempt or by a racing one.
    AlreadyAttested,
    /// The window for the outcome has not opened yet.
    NotDueYet(TimingError),
    /// The window for the outcome has closed.
    WindowMissed(TimingError),
    /// The booking does not exist or could not be read.
    BookingNotFound,
    /// The booking's slot does not exist or could not be read.
    SlotNotFound,
    /// The booking was cancelled and can no longer be attested.
    BookingCancelled,
    /// Submitting the attestation failed.
    Failed(EscrowError),
}

impl AttemptOutcome {
    /// Whether the booking needs no further attestation attempts.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Submitted { .. } | Self::AlreadyAttested)
    }

    /// Whether the scheduler should try again later.
    ///
    /// Missing bookings and slots are retryable, since reads report `None` for transient RPC
    /// failures as well.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotDueYet(_) | Self::BookingNotFound | Self::SlotNotFound | Self::Failed(_) => {
                true
            }
            Self::Submitted { .. }
            | Self::AlreadyAttested
            | Self::WindowMissed(_)
            | Self::BookingCancelled => false,
        }
    }

    /// Returns the machine-readable reason for an attempt that did not settle the booking.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Submitted { .. } | Self::AlreadyAttested => None,
            Self::NotDueYet(err) | Self::WindowMissed(err) => Some(err.as_str()),
            Self::BookingNotFound => Some("booking_not_found"),
            Self::SlotNotFound => Some("slot_not_found"),
            Self::BookingCancelled => Some("booking_cancelled"),
            Self::Failed(_) => Some("attest_failed"),
        }
    }
}

impl From<TimingError> for AttemptOutcome {
    fn from(err: TimingError) -> Self {
        match err.scheduler_timing() {
            SchedulerTiming::NotDueYet => Self::NotDueYet(err),
            SchedulerTiming::WindowMissed => Self::WindowMissed(err),
        }
    }
}

/// Runs attestation attempts against an [`EscrowClient`].
#[derive(Debug, Clone)]
pub struct Attestor {
    client: EscrowClient,
}

impl Attestor {
    /// Creates a new [`Attestor`].
    pub fn new(client: EscrowClient) -> Self {
        Self { client }
    }

    /// The underlying escrow client.
    pub fn client(&self) -> &EscrowClient {
        &self.client
    }

    /// Runs one attempt. Nothing is retried.
    #[instrument(
        skip(self, request),
        fields(booking_id = %request.booking_id, outcome = %request.outcome)
    )]
    pub async fn attempt(&self, request: &AttestationRequest) -> AttemptOutcome {
        let Some(booking) = self.client.get_booking(request.booking_id).await else {
            return AttemptOutcome::BookingNotFound;
        };

        match booking.status {
            BookingStatus::Booked => {}
            BookingStatus::Cancelled => return AttemptOutcome::BookingCancelled,
            status if status.is_attested() => {
                info!(?status, "Booking already attested");
                return AttemptOutcome::AlreadyAttested;
            }
            status => {
                warn!(?status, "Unexpected booking status");
                return AttemptOutcome::BookingNotFound;
            }
        }

        let Some(slot) = self.client.get_slot(booking.slotId).await else {
            return AttemptOutcome::SlotNotFound;
        };

        let windows = AttestationWindows::new(&slot.schedule());
        if let Err(err) = validate_attestation_window(request.outcome, request.now, &windows) {
            info!(reason = err.as_str(), now = request.now, ?windows, "Outside attestation window");
            return err.into();
        }

        let metrics_hash = compute_metrics_hash(request.booking_id, &request.metrics);
        match self
            .client
            .attest_outcome(request.booking_id, request.outcome.into(), metrics_hash)
            .await
        {
            Ok(tx_hash) => AttemptOutcome::Submitted { tx_hash, metrics_hash },
            Err(err) if err.is_idempotent_attestation() => AttemptOutcome::AlreadyAttested,
            Err(err) => AttemptOutcome::Failed(err),
        }
    }
}
