//! Classification of `attest` failures that mean the booking was already attested.
//!
//! Transaction submission can race: two attesters submit for the same booking, or a retry is
//! sent after a transaction that landed but whose confirmation was missed. The contract then
//! reverts because the booking has left the `Booked` status. Such reverts are matched against
//! [`IDEMPOTENT_ATTESTATION_PHRASES`] so the caller can treat them as a successful no-op.
//!
//! Unknown phrasing is never matched, so new revert messages surface as real failures.

/// Revert phrases, lowercase, that indicate the booking already left the `Booked` status through
/// an attestation.
///
/// `status is cancelled` is not listed: a cancelled booking was never attested.
pub const IDEMPOTENT_ATTESTATION_PHRASES: &[&str] = &[
    // `status is Attested, expected Booked`
    "status is attested",
    // attested, then challenged
    "status is disputed",
    // dispute settled
    "status is resolved",
    // dispute window elapsed
    "status is finalized",
    // `status is not booked`, `booking not booked`
    "not booked",
];

/// Returns `true` if an `attest` failure message means the booking was already attested.
///
/// Matching is case-insensitive against [`IDEMPOTENT_ATTESTATION_PHRASES`].
pub fn is_idempotent_attestation_error(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    IDEMPOTENT_ATTESTATION_PHRASES.iter().any(|phrase| message.contains(phrase))
}
