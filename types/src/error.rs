//! Stable error taxonomy shared across crates.
//!
//! Each crate defines its own error enum; every one of them maps onto exactly
//! one [`ErrorKind`] so hosts can react to failures without matching on
//! crate-specific variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Wrong caller for the operation.
    Authorization,
    /// Missing member, order or proposal.
    NotFound,
    /// Duplicate pending action, or entity already finalized/executed/blocked/voted.
    StateConflict,
    /// Rank, authority or parameter direction/bounds violated.
    Validation,
    /// Order or proposal limits, or insufficient veto seniority.
    QuotaExceeded,
    /// Too early or too late.
    Timing,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StateConflict => "state_conflict",
            ErrorKind::Validation => "validation",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::Timing => "timing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown rank: {0:?}")]
pub struct ParseRankError(pub String);
