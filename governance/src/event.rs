use guild_types::{LedgerIndex, MemberId, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::proposal::{Ballot, ProposalKind, ProposalOutcome};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalEvent {
    Created {
        proposal: ProposalId,
        kind: ProposalKind,
        proposer: MemberId,
        /// The action in its fixed encoding; see [`crate::ProposalAction::decode`].
        payload: Vec<u8>,
        snapshot: LedgerIndex,
        end: Timestamp,
    },
    Voted {
        proposal: ProposalId,
        voter: MemberId,
        ballot: Ballot,
        weight: u128,
    },
    Finalized {
        proposal: ProposalId,
        outcome: ProposalOutcome,
        /// Whether the effect changed state. False for failed proposals and
        /// for governance blocks of orders that had already ended.
        applied: bool,
    },
}
