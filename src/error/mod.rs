//! Attestor error types.
use crate::idempotency::is_idempotent_attestation_error;
use alloy::{
    primitives::{B256, ChainId},
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

/// Errors returned when talking to the session escrow contract.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// An attestation was requested from a client without an oracle key.
    #[error("no oracle key configured, cannot sign attestations")]
    MissingOracleKey,
    /// The oracle key could not be parsed.
    #[error("invalid oracle key: {0}")]
    InvalidOracleKey(#[from] alloy::signers::local::LocalSignerError),
    /// The RPC endpoint serves a different chain than configured.
    #[error("chain id mismatch, expected {expected}, endpoint reports {got}")]
    ChainMismatch {
        /// The configured chain id.
        expected: ChainId,
        /// The chain id reported by the endpoint.
        got: ChainId,
    },
    /// The attestation transaction was mined but reverted.
    #[error("attestation transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: B256,
    },
    /// No receipt arrived for the attestation transaction in time.
    #[error("attestation transaction was not confirmed: {0}")]
    Unconfirmed(PendingTransactionError),
    /// A contract call reverted or could not be decoded.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

impl EscrowError {
    /// Whether this failure means the booking was already attested and can be treated as a
    /// successful no-op.
    pub fn is_idempotent_attestation(&self) -> bool {
        match self {
            Self::Contract(_) | Self::Rpc(_) => is_idempotent_attestation_error(&self.to_string()),
            Self::MissingOracleKey
            | Self::InvalidOracleKey(_)
            | Self::ChainMismatch { .. }
            | Self::Reverted { .. }
            | Self::Unconfirmed(_) => false,
        }
    }
}

impl From<PendingTransactionError> for EscrowError {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::TransportError(err) => Self::Rpc(err),
            err => Self::Unconfirmed(err),
        }
    }
}
