//! Democratic governance for the guild.
//!
//! Lifecycle: Active (voting open until `end`) → Ended → Finalized.
//!
//! - Voting weight is read from the voting-power ledger at the proposal's
//!   snapshot index, never the current one, so membership changes made while
//!   a proposal is live cannot reweight it.
//! - A proposal passes iff `yes + no >= quorum` and `yes > no`. A tie fails.
//! - A passed proposal dispatches exactly one typed effect through the
//!   authorization gateway, after re-checking its target.

pub mod engine;
pub mod error;
pub mod event;
pub mod proposal;
pub mod tally;

pub use engine::{ProposalEngine, MIN_GOVERNING_RANK};
pub use error::ProposalError;
pub use event::ProposalEvent;
pub use guild_types::GovernableParam;
pub use proposal::{Ballot, Proposal, ProposalAction, ProposalKind, ProposalOutcome, ProposalState};
pub use tally::{decide, quorum_threshold, FailureReason};
