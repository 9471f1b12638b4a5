//! End-to-end attestation attempts over the fixture escrow.

use alloy::primitives::{Address, B256, U256};
use session_attestor::{
    attestation::{AttemptOutcome, AttestationRequest, Attestor},
    config::{AttestorConfig, EscrowBackend},
    constants::FIXTURE_ATTEST_TX_HASH,
    escrow::{EscrowClient, FixtureEscrow, fixture_booking, fixture_slot},
    idempotency::is_idempotent_attestation_error,
    timing::{
        AttestationWindows, OutcomeKind, SchedulerTiming, TimingError,
        classify_attestation_timing_for_scheduler, validate_attestation_window,
    },
    types::{AttestMetrics, Booking, BookingStatus, Slot, compute_metrics_hash},
};
use std::sync::Arc;

fn attestor() -> Attestor {
    let config = AttestorConfig::default().with_backend(EscrowBackend::Fixture);
    Attestor::new(config.escrow_client().unwrap())
}

fn no_show_metrics() -> AttestMetrics {
    AttestMetrics {
        host_joined_at: Some(1_700_000_000),
        host_left_at: Some(1_700_002_000),
        guest_joined_at: None,
        guest_left_at: None,
        overlap_seconds: 0,
    }
}

/// Walks a no-show attempt across its window the way a scheduler loop would.
#[tokio::test]
async fn scheduler_walks_no_show_window() {
    let attestor = attestor();
    let mut request = AttestationRequest {
        booking_id: U256::from(1),
        outcome: OutcomeKind::NoShowGuest,
        metrics: no_show_metrics(),
        now: 1_700_000_000,
    };

    let outcome = attestor.attempt(&request).await;
    let reason = outcome.reason().unwrap();
    assert_eq!(reason, TimingError::GraceNotOver.as_str());
    assert_eq!(
        classify_attestation_timing_for_scheduler(reason),
        Some(SchedulerTiming::NotDueYet)
    );
    assert!(outcome.is_retryable());

    request.now = 1_700_000_300;
    match attestor.attempt(&request).await {
        AttemptOutcome::Submitted { tx_hash, metrics_hash } => {
            assert_eq!(tx_hash, FIXTURE_ATTEST_TX_HASH);
            assert_eq!(metrics_hash, compute_metrics_hash(U256::from(1), &no_show_metrics()));
        }
        outcome => panic!("expected submission, got {outcome:?}"),
    }

    request.now = 1_700_002_101;
    let outcome = attestor.attempt(&request).await;
    let reason = outcome.reason().unwrap();
    assert_eq!(
        classify_attestation_timing_for_scheduler(reason),
        Some(SchedulerTiming::WindowMissed)
    );
    assert!(!outcome.is_retryable());
}

#[tokio::test]
async fn off_chain_windows_match_fixture_slot() {
    let client = EscrowClient::fixture();
    let booking = client.get_booking(U256::from(1)).await.unwrap();
    let slot = client.get_slot(booking.slotId).await.unwrap();
    let windows = AttestationWindows::new(&slot.schedule());

    assert_eq!(windows.no_show_earliest, 1_700_000_300);
    assert_eq!(windows.no_show_latest, 1_700_002_100);
    assert_eq!(windows.completed_earliest, 1_700_000_600);
    assert_eq!(windows.completed_latest, 1_700_009_000);
    assert_eq!(
        validate_attestation_window(OutcomeKind::Completed, windows.completed_latest, &windows),
        Ok(())
    );
}

#[tokio::test]
async fn missing_slot_is_reported() {
    let fixture =
        FixtureEscrow::default().with_slot(Slot { host: Address::ZERO, ..fixture_slot() });
    let attestor = Attestor::new(EscrowClient::new(Arc::new(fixture)));
    let outcome = attestor
        .attempt(&AttestationRequest {
            booking_id: U256::from(1),
            outcome: OutcomeKind::Completed,
            metrics: AttestMetrics::default(),
            now: 1_700_001_000,
        })
        .await;
    assert!(matches!(outcome, AttemptOutcome::SlotNotFound));
    assert_eq!(classify_attestation_timing_for_scheduler(outcome.reason().unwrap()), None);
}

#[tokio::test]
async fn retried_attestation_after_landing_is_settled() {
    let fixture = FixtureEscrow::default().with_booking(Booking {
        status: BookingStatus::Attested,
        metricsHash: B256::repeat_byte(0xab),
        attestedAt: 1_700_002_000,
        ..fixture_booking()
    });
    let attestor = Attestor::new(EscrowClient::new(Arc::new(fixture)));
    let outcome = attestor
        .attempt(&AttestationRequest {
            booking_id: U256::from(1),
            outcome: OutcomeKind::Completed,
            metrics: AttestMetrics::default(),
            now: 1_700_002_000,
        })
        .await;
    assert!(outcome.is_settled());
    assert!(is_idempotent_attestation_error(
        "execution reverted: status is Attested, expected Booked"
    ));
}
