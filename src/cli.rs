//! # Attestor CLI
use crate::{
    attestation::{AttemptOutcome, AttestationRequest, Attestor},
    config::{AttestorConfig, EscrowBackend},
    timing::{
        AttestationWindows, OutcomeKind, SlotSchedule, validate_attestation_window,
    },
    types::{AttestMetrics, canonical_metrics_json, compute_metrics_hash},
    version::ATTESTOR_SHORT_VERSION,
};
use alloy::primitives::{Address, ChainId, U256};
use chrono::Utc;
use clap::{Parser, Subcommand};
use eyre::{Context, OptionExt, bail};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Attests the outcome of booked sessions on the session escrow.
#[derive(Debug, Parser)]
#[command(author, version = ATTESTOR_SHORT_VERSION, about = "Session attestor", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, the defaults are used together with the flags below.
    #[arg(long, value_name = "CONFIG", env = "ATTESTOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// The RPC endpoint of the chain the escrow is deployed on.
    #[arg(long, value_name = "RPC_URL", env = "ATTESTOR_RPC_URL", global = true)]
    pub rpc_url: Option<Url>,
    /// The address of the escrow contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    pub escrow: Option<Address>,
    /// The chain id of the escrow deployment.
    #[arg(long, value_name = "CHAIN_ID", global = true)]
    pub chain_id: Option<ChainId>,
    /// The oracle key to sign attestations with.
    #[arg(
        long,
        value_name = "SECRET_KEY",
        env = "ATTESTOR_ORACLE_KEY",
        hide_env_values = true,
        global = true
    )]
    pub oracle_key: Option<String>,
    /// Serve fixed fixture values instead of talking to a chain.
    #[arg(long, global = true)]
    pub fixture: bool,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands available in the attestor CLI.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the attestation windows for a schedule.
    Windows(ScheduleArgs),
    /// Read a slot from the escrow.
    Slot {
        /// The slot id.
        slot_id: U256,
    },
    /// Read a booking from the escrow.
    Booking {
        /// The booking id.
        booking_id: U256,
    },
    /// Check whether an outcome may be attested for a booking.
    Check {
        /// The booking id.
        booking_id: U256,
        /// The outcome to check (no-show-host, no-show-guest, completed).
        #[arg(long)]
        outcome: OutcomeKind,
        /// Unix seconds to check at. Defaults to now.
        #[arg(long)]
        now: Option<u64>,
    },
    /// Print the metrics commitment for a booking.
    MetricsHash {
        /// The booking id.
        booking_id: U256,
        /// JSON file with the presence metrics.
        #[arg(long, value_name = "FILE")]
        metrics: PathBuf,
    },
    /// Attest the outcome of a booking.
    Attest {
        /// The booking id.
        booking_id: U256,
        /// The outcome to attest (no-show-host, no-show-guest, completed).
        #[arg(long)]
        outcome: OutcomeKind,
        /// JSON file with the presence metrics.
        #[arg(long, value_name = "FILE")]
        metrics: PathBuf,
        /// Unix seconds to validate the window at. Defaults to now.
        #[arg(long)]
        now: Option<u64>,
    },
}

/// Schedule parameters of a slot.
#[derive(Debug, Clone, clap::Args)]
pub struct ScheduleArgs {
    /// Scheduled start, unix seconds.
    #[arg(long)]
    pub start_time: u64,
    /// Nominal session length in minutes.
    #[arg(long)]
    pub duration_mins: u64,
    /// No-show grace period in minutes.
    #[arg(long)]
    pub grace_mins: u64,
    /// Minimum overlap for a completed session in minutes.
    #[arg(long)]
    pub min_overlap_mins: u64,
}

impl From<ScheduleArgs> for SlotSchedule {
    fn from(args: ScheduleArgs) -> Self {
        Self {
            start_time: args.start_time,
            duration_mins: args.duration_mins,
            grace_mins: args.grace_mins,
            min_overlap_mins: args.min_overlap_mins,
        }
    }
}

impl Args {
    /// Resolves the configuration from the config file and flags.
    pub fn resolve_config(&self) -> eyre::Result<AttestorConfig> {
        let config = match &self.config {
            Some(path) => AttestorConfig::load_from_file(path)?,
            None => AttestorConfig::default(),
        };
        let mut config = config
            .with_rpc_url(self.rpc_url.clone())
            .with_escrow(self.escrow)
            .with_chain_id(self.chain_id)
            .with_oracle_key(self.oracle_key.clone());
        if self.fixture {
            config = config.with_backend(EscrowBackend::Fixture);
        }
        Ok(config)
    }

    /// Run the command.
    pub async fn run(self) -> eyre::Result<()> {
        let config = self.resolve_config()?;

        match self.command {
            Command::Windows(schedule) => {
                let windows = AttestationWindows::new(&schedule.into());
                println!("{}", serde_json::to_string_pretty(&windows)?);
            }
            Command::MetricsHash { booking_id, metrics } => {
                let metrics = read_metrics(&metrics)?;
                println!("{}", canonical_metrics_json(booking_id, &metrics));
                println!("{}", compute_metrics_hash(booking_id, &metrics));
            }
            Command::Slot { slot_id } => {
                let client = config.escrow_client()?;
                let slot = client.get_slot(slot_id).await.ok_or_eyre("slot not found")?;
                println!("{slot:#?}");
            }
            Command::Booking { booking_id } => {
                let client = config.escrow_client()?;
                let booking =
                    client.get_booking(booking_id).await.ok_or_eyre("booking not found")?;
                println!("{booking:#?}");
            }
            Command::Check { booking_id, outcome, now } => {
                let client = config.escrow_client()?;
                let booking =
                    client.get_booking(booking_id).await.ok_or_eyre("booking not found")?;
                let slot = client.get_slot(booking.slotId).await.ok_or_eyre("slot not found")?;
                let windows = AttestationWindows::new(&slot.schedule());
                let now = now.unwrap_or_else(unix_now);

                let result = match validate_attestation_window(outcome, now, &windows) {
                    Ok(()) => json!({ "ok": true, "now": now, "windows": windows }),
                    Err(err) => json!({
                        "ok": false,
                        "error": err.as_str(),
                        "scheduler": err.scheduler_timing().as_str(),
                        "now": now,
                        "windows": windows,
                    }),
                };
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Command::Attest { booking_id, outcome, metrics, now } => {
                let attestor = Attestor::new(config.escrow_client()?);
                let request = AttestationRequest {
                    booking_id,
                    outcome,
                    metrics: read_metrics(&metrics)?,
                    now: now.unwrap_or_else(unix_now),
                };

                match attestor.attempt(&request).await {
                    AttemptOutcome::Submitted { tx_hash, metrics_hash } => {
                        info!(%tx_hash, %metrics_hash, "Attestation submitted");
                        println!("{tx_hash}");
                    }
                    AttemptOutcome::AlreadyAttested => {
                        info!(%booking_id, "Booking already attested");
                    }
                    AttemptOutcome::Failed(err) => return Err(err).wrap_err("attestation failed"),
                    outcome => bail!(
                        "attestation not submitted: {} (retryable: {})",
                        outcome.reason().unwrap_or_default(),
                        outcome.is_retryable()
                    ),
                }
            }
        }

        Ok(())
    }
}

/// Reads presence metrics from a JSON file.
fn read_metrics(path: &Path) -> eyre::Result<AttestMetrics> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read metrics file: {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse metrics file: {}", path.display()))
}

/// Current unix time in seconds.
fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_check_command() {
        let args = Args::try_parse_from([
            "session-attestor",
            "--fixture",
            "check",
            "7",
            "--outcome",
            "no-show-guest",
            "--now",
            "1700000300",
        ])
        .unwrap();
        assert!(args.fixture);
        assert!(matches!(
            args.command,
            Command::Check { outcome: OutcomeKind::NoShowGuest, now: Some(1_700_000_300), .. }
        ));
    }

    #[test]
    fn rejects_unknown_outcome() {
        assert!(
            Args::try_parse_from(["session-attestor", "check", "7", "--outcome", "no_show"])
                .is_err()
        );
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "session-attestor",
            "--chain-id",
            "8453",
            "--escrow",
            "0x3333333333333333333333333333333333333333",
            "slot",
            "1",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.chain_id, 8453);
        assert_eq!(config.backend, EscrowBackend::Rpc);
        assert_eq!(config.escrow.to_string(), "0x3333333333333333333333333333333333333333");
    }
}
