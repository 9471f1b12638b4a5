//! JSON-RPC backed session escrow.

use super::EscrowApi;
use crate::{
    constants::ATTESTATION_RECEIPT_TIMEOUT,
    error::EscrowError,
    types::{Booking, Outcome, SessionEscrow, Slot, attest_call},
};
use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, B256, ChainId, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

/// Location of a deployed `SessionEscrowV1` contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEndpoint {
    /// JSON-RPC endpoint of the chain.
    pub rpc_url: Url,
    /// Address of the escrow contract.
    pub escrow: Address,
    /// Chain the contract is deployed on. Attestations are signed for this chain only.
    pub chain_id: ChainId,
}

/// Parses a raw hex oracle key, with or without `0x` prefix.
pub fn parse_oracle_key(key: &str) -> Result<PrivateKeySigner, EscrowError> {
    Ok(key.trim().parse::<PrivateKeySigner>()?)
}

/// [`EscrowApi`] implementation over JSON-RPC.
#[derive(Debug)]
pub struct RpcEscrow {
    endpoint: EscrowEndpoint,
    /// Provider used for reads.
    reader: DynProvider,
    /// Provider signing with the oracle key, if one was given.
    writer: Option<DynProvider>,
}

impl RpcEscrow {
    /// Creates a new [`RpcEscrow`]. No request is made until the first call.
    pub fn new(endpoint: EscrowEndpoint, oracle: Option<PrivateKeySigner>) -> Self {
        let reader = ProviderBuilder::new().connect_http(endpoint.rpc_url.clone()).erased();
        let writer = oracle.map(|signer| {
            debug!(oracle = %signer.address(), "Using oracle signer");
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(endpoint.rpc_url.clone())
                .erased()
        });
        Self::with_providers(endpoint, reader, writer)
    }

    /// Creates a new [`RpcEscrow`] over existing providers.
    ///
    /// `writer` must sign with the oracle key. `endpoint.rpc_url` is informational only.
    pub fn with_providers(
        endpoint: EscrowEndpoint,
        reader: DynProvider,
        writer: Option<DynProvider>,
    ) -> Self {
        Self { endpoint, reader, writer }
    }

    /// The endpoint this escrow talks to.
    pub fn endpoint(&self) -> &EscrowEndpoint {
        &self.endpoint
    }

    fn contract(&self) -> SessionEscrow<DynProvider> {
        SessionEscrow::new(self.endpoint.escrow, self.reader.clone())
    }
}

#[async_trait]
impl EscrowApi for RpcEscrow {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn slot(&self, slot_id: U256) -> Result<Slot, EscrowError> {
        Ok(self.contract().slot(slot_id).await?)
    }

    async fn booking(&self, booking_id: U256) -> Result<Booking, EscrowError> {
        Ok(self.contract().booking(booking_id).await?)
    }

    #[instrument(
        skip(self),
        fields(escrow = %self.endpoint.escrow, chain_id = self.endpoint.chain_id)
    )]
    async fn attest(
        &self,
        booking_id: U256,
        outcome: Outcome,
        metrics_hash: B256,
    ) -> Result<B256, EscrowError> {
        let writer = self.writer.as_ref().ok_or(EscrowError::MissingOracleKey)?;

        let got = writer.get_chain_id().await?;
        if got != self.endpoint.chain_id {
            return Err(EscrowError::ChainMismatch { expected: self.endpoint.chain_id, got });
        }

        let request = TransactionRequest::default()
            .with_to(self.endpoint.escrow)
            .with_chain_id(self.endpoint.chain_id)
            .with_input(attest_call(booking_id, outcome, metrics_hash).abi_encode());

        let pending = writer.send_transaction(request).await?;
        debug!(tx_hash = %pending.tx_hash(), "Sent attestation, waiting for receipt");

        let receipt =
            pending.with_timeout(Some(ATTESTATION_RECEIPT_TIMEOUT)).get_receipt().await?;
        ensure_success(&receipt)
    }
}

/// Returns the transaction hash of a mined attestation, or [`EscrowError::Reverted`].
fn ensure_success(receipt: &TransactionReceipt) -> Result<B256, EscrowError> {
    let tx_hash = receipt.transaction_hash();
    if !receipt.status() {
        warn!(%tx_hash, block_number = ?receipt.block_number(), "Attestation reverted");
        return Err(EscrowError::Reverted { tx_hash });
    }
    Ok(tx_hash)
}
