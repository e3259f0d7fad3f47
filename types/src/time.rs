//! Timestamp type used throughout the engine.
//!
//! Timestamps are Unix epoch seconds (UTC) as reported by the host ledger's
//! authoritative clock. The engine never reads the system clock itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the voting-power ledger. Ledger entries are indexed by the
/// clock second at which they were written.
pub type LedgerIndex = u64;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// The ledger index a write at this instant lands on.
    pub fn ledger_index(&self) -> LedgerIndex {
        self.0
    }

    /// The last ledger index that is fully closed at this instant.
    ///
    /// Writes committed later in the current second may still land on
    /// `ledger_index()`, so snapshots pin the index before it.
    pub fn closed_ledger_index(&self) -> LedgerIndex {
        self.0.saturating_sub(1)
    }

    /// This timestamp shifted forward by `secs`, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
