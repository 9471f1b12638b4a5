//! Shared primitive types.
mod escrow;
pub use escrow::*;

mod presence;
pub use presence::*;
