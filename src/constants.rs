//! Attestor constants.

use alloy::primitives::{B256, b256};
use std::time::Duration;

/// Seconds per minute, used to scale slot schedule fields.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Grace period after a slot's nominal end during which a `Completed` attestation is still
/// accepted.
///
/// This covers late submission, not late sessions, and must match the escrow contract's constant
/// exactly.
pub const COMPLETED_ATTESTATION_GRACE: Duration = Duration::from_secs(2 * 3600);

/// JSON-RPC endpoint used when none is configured.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// How long to wait for the receipt of an attestation transaction.
pub const ATTESTATION_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transaction hash returned by the fixture backend for every attestation.
pub const FIXTURE_ATTEST_TX_HASH: B256 =
    b256!("0x00000000000000000000000000000000000000000000000000000000000a77e5");
