//! Metrics recorded by the escrow client.
//!
//! No exporter is installed here; the embedding service decides where metrics go.

use metrics::Counter;
use metrics_derive::Metrics;

/// Metrics for an [`EscrowClient`](crate::escrow::EscrowClient).
#[derive(Metrics, Clone)]
#[metrics(scope = "escrow")]
pub struct EscrowMetrics {
    /// Number of slot and booking reads.
    pub reads: Counter,
    /// Number of reads that failed and were reported as absent.
    pub read_failures: Counter,
    /// Number of submitted attestations.
    pub attestations_submitted: Counter,
    /// Number of failed attestations.
    pub attestation_failures: Counter,
    /// Number of failed attestations that turned out to be already attested.
    pub idempotent_attestations: Counter,
}
