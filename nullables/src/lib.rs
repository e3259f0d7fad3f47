//! Nullable infrastructure for deterministic testing.
//!
//! The engine's environment (clock, treasury custody, fee bookkeeping) is
//! external. This crate provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record every call forwarded to them for later inspection
//!
//! Usage: hand these to the gateway in place of the host's collaborators.

pub mod clock;
pub mod fees;
pub mod treasury;

pub use clock::NullClock;
pub use fees::NullFeeLedger;
pub use treasury::{NullTreasury, TransferRecord};
