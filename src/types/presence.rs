//! Off-chain presence metrics and their on-chain commitment.

use alloy::primitives::{B256, U256, keccak256};
use serde::{Deserialize, Serialize};

/// Presence data collected by the session service for a booking.
///
/// Only the [`compute_metrics_hash`] commitment is submitted on-chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestMetrics {
    /// When the host joined, unix seconds. `None` if the host never joined.
    pub host_joined_at: Option<u64>,
    /// When the host left, unix seconds.
    pub host_left_at: Option<u64>,
    /// When the guest joined, unix seconds. `None` if the guest never joined.
    pub guest_joined_at: Option<u64>,
    /// When the guest left, unix seconds.
    pub guest_left_at: Option<u64>,
    /// Seconds both parties were present at the same time.
    pub overlap_seconds: u64,
}

/// The canonical document hashed into the metrics commitment.
///
/// Field order is part of the commitment and must not change.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsCommitment<'a> {
    booking_id: String,
    #[serde(flatten)]
    metrics: &'a AttestMetrics,
}

/// Computes the `metricsHash` committed alongside an attestation.
///
/// The hash is `keccak256` over the compact JSON encoding of
/// `{"bookingId":"<decimal id>","hostJoinedAt":..,"hostLeftAt":..,"guestJoinedAt":..,"guestLeftAt":..,"overlapSeconds":..}`.
pub fn compute_metrics_hash(booking_id: U256, metrics: &AttestMetrics) -> B256 {
    keccak256(canonical_metrics_json(booking_id, metrics))
}

/// Returns the canonical JSON document for a booking's metrics.
pub fn canonical_metrics_json(booking_id: U256, metrics: &AttestMetrics) -> String {
    let commitment = MetricsCommitment { booking_id: booking_id.to_string(), metrics };
    // Serializing a struct of integers and strings into a `String` cannot fail.
    serde_json::to_string(&commitment).unwrap_or_default()
}
