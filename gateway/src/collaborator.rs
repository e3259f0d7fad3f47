//! External collaborators reached through the gateway.
//!
//! Fund custody and fee bookkeeping live outside the core. The gateway only
//! forwards governance-approved effects to them and reads the fee service's
//! standing verdict.

use guild_types::{ErrorKind, Identity, MemberId, Timestamp, TokenId};
use thiserror::Error;

/// Failure reported by a collaborator, tagged with the taxonomy kind the
/// caller should observe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CollaboratorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Fund custody and per-period spending bookkeeping.
pub trait Treasury {
    fn transfer(
        &mut self,
        token: &TokenId,
        recipient: &Identity,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), CollaboratorError>;
}

/// Fee collection and epoch-based standing.
pub trait FeeLedger {
    /// Clear any fee exemption the member holds.
    fn reset_exemption(&mut self, member: MemberId, now: Timestamp) -> Result<(), CollaboratorError>;

    /// Whether the member is paid up for the epoch containing `now`.
    fn in_good_standing(&self, member: MemberId, now: Timestamp) -> bool;
}
