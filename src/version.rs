//! Attestor version.

/// The short version information for the attestor.
pub const ATTESTOR_SHORT_VERSION: &str = env!("CARGO_PKG_VERSION");
