//! Quorum and majority math.

use guild_types::params::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};

use crate::proposal::ProposalOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Fewer votes than `quorum_threshold` were cast.
    QuorumNotMet,
    /// Quorum met with `yes == no`.
    Tie,
    /// Quorum met with `no > yes`.
    Rejected,
}

/// Minimum participating power: `total * quorum_bps / 10000`, rounded down.
pub fn quorum_threshold(total_at_snapshot: u128, quorum_bps: u64) -> u128 {
    total_at_snapshot * u128::from(quorum_bps) / u128::from(BPS_DENOMINATOR)
}

/// Decide a proposal: passes iff `yes + no >= quorum` and `yes > no`.
///
/// The majority comparison is strict. A tie that meets quorum still fails.
pub fn decide(yes: u128, no: u128, total_at_snapshot: u128, quorum_bps: u64) -> ProposalOutcome {
    if yes + no < quorum_threshold(total_at_snapshot, quorum_bps) {
        return ProposalOutcome::Failed(FailureReason::QuorumNotMet);
    }
    match yes.cmp(&no) {
        std::cmp::Ordering::Greater => ProposalOutcome::Succeeded,
        std::cmp::Ordering::Equal => ProposalOutcome::Failed(FailureReason::Tie),
        std::cmp::Ordering::Less => ProposalOutcome::Failed(FailureReason::Rejected),
    }
}
