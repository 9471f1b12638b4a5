//! Attestor configuration.
use crate::{
    constants::DEFAULT_RPC_URL,
    error::EscrowError,
    escrow::{EscrowClient, EscrowEndpoint, parse_oracle_key},
};
use alloy::primitives::{Address, ChainId};
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use url::Url;

/// Attestor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestorConfig {
    /// Which escrow backend to use.
    #[serde(default)]
    pub backend: EscrowBackend,
    /// JSON-RPC endpoint of the chain the escrow is deployed on.
    pub rpc_url: Url,
    /// Escrow contract address.
    pub escrow: Address,
    /// Chain id of the escrow deployment.
    pub chain_id: ChainId,
    /// Secrets.
    #[serde(skip_serializing, default)]
    pub secrets: SecretsConfig,
}

impl Default for AttestorConfig {
    fn default() -> Self {
        Self {
            backend: EscrowBackend::default(),
            rpc_url: Url::parse(DEFAULT_RPC_URL).unwrap(),
            escrow: Address::ZERO,
            chain_id: 31337,
            secrets: SecretsConfig::default(),
        }
    }
}

impl AttestorConfig {
    /// Sets the escrow backend.
    pub fn with_backend(mut self, backend: EscrowBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: Option<Url>) -> Self {
        if let Some(rpc_url) = rpc_url {
            self.rpc_url = rpc_url;
        }
        self
    }

    /// Sets the escrow contract address.
    pub fn with_escrow(mut self, escrow: Option<Address>) -> Self {
        if let Some(escrow) = escrow {
            self.escrow = escrow;
        }
        self
    }

    /// Sets the chain id.
    pub fn with_chain_id(mut self, chain_id: Option<ChainId>) -> Self {
        if let Some(chain_id) = chain_id {
            self.chain_id = chain_id;
        }
        self
    }

    /// Sets the oracle key used to sign attestations.
    pub fn with_oracle_key(mut self, oracle_key: Option<String>) -> Self {
        self.secrets.oracle_key = oracle_key.or(self.secrets.oracle_key);
        self
    }

    /// The escrow endpoint described by this configuration.
    pub fn endpoint(&self) -> EscrowEndpoint {
        EscrowEndpoint {
            rpc_url: self.rpc_url.clone(),
            escrow: self.escrow,
            chain_id: self.chain_id,
        }
    }

    /// Builds the [`EscrowClient`] for the configured backend.
    pub fn escrow_client(&self) -> Result<EscrowClient, EscrowError> {
        match self.backend {
            EscrowBackend::Fixture => {
                info!("Using fixture escrow backend");
                Ok(EscrowClient::fixture())
            }
            EscrowBackend::Rpc => {
                let oracle =
                    self.secrets.oracle_key.as_deref().map(parse_oracle_key).transpose()?;
                info!(
                    rpc_url = %self.rpc_url,
                    escrow = %self.escrow,
                    chain_id = self.chain_id,
                    oracle = ?oracle.as_ref().map(|signer| signer.address()),
                    "Using RPC escrow backend"
                );
                Ok(EscrowClient::rpc(self.endpoint(), oracle))
            }
        }
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Escrow backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscrowBackend {
    /// A deployed contract reached over JSON-RPC.
    #[default]
    Rpc,
    /// Fixed fixture values, no network I/O.
    Fixture,
}

/// Secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Raw hex private key of the oracle. Only needed to attest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_key: Option<String>,
}
