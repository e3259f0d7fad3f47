//! Governance proposals and their lifecycle.

use crate::error::ProposalError;
use crate::tally::FailureReason;
use guild_types::{
    GovernableParam, Identity, LedgerIndex, MemberId, OrderId, ProposalId, Rank, Timestamp, TokenId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a governance proposal changes. Each variant carries only its own payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalAction {
    /// Raise `target` to `new_rank`.
    GrantRank { target: MemberId, new_rank: Rank },
    /// Lower `target` to `new_rank`.
    DemoteRank { target: MemberId, new_rank: Rank },
    /// Rebind `target` to a new controlling identity.
    ChangeAuthority { target: MemberId, new_identity: Identity },
    /// Change a governance parameter.
    ParameterChange { param: GovernableParam, new_value: u64 },
    /// Block a pending order.
    BlockOrder { order: OrderId },
    /// Pay out of the treasury.
    TransferFunds {
        token: TokenId,
        recipient: Identity,
        amount: u128,
    },
    /// Clear a member's fee exemption.
    ResetFeeExemption { target: MemberId },
}

impl ProposalAction {
    pub fn kind(&self) -> ProposalKind {
        match self {
            Self::GrantRank { .. } => ProposalKind::GrantRank,
            Self::DemoteRank { .. } => ProposalKind::DemoteRank,
            Self::ChangeAuthority { .. } => ProposalKind::ChangeAuthority,
            Self::ParameterChange { param, .. } => match param {
                GovernableParam::VotingPeriod => ProposalKind::SetVotingPeriod,
                GovernableParam::QuorumBps => ProposalKind::SetQuorumBps,
                GovernableParam::OrderDelay => ProposalKind::SetOrderDelay,
                GovernableParam::ExecutionDelay => ProposalKind::SetExecutionDelay,
                GovernableParam::InviteExpiry => ProposalKind::SetInviteExpiry,
            },
            Self::BlockOrder { .. } => ProposalKind::BlockOrder,
            Self::TransferFunds { .. } => ProposalKind::TransferFunds,
            Self::ResetFeeExemption { .. } => ProposalKind::ResetFeeExemption,
        }
    }

    /// The member this proposal acts on, if any.
    pub fn target(&self) -> Option<MemberId> {
        match self {
            Self::GrantRank { target, .. }
            | Self::DemoteRank { target, .. }
            | Self::ChangeAuthority { target, .. }
            | Self::ResetFeeExemption { target } => Some(*target),
            Self::ParameterChange { .. } | Self::BlockOrder { .. } | Self::TransferFunds { .. } => None,
        }
    }

    /// Fixed binary encoding of the payload, published with each created proposal.
    pub fn encode(&self) -> Result<Vec<u8>, ProposalError> {
        bincode::serialize(self).map_err(|e| ProposalError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProposalError> {
        bincode::deserialize(bytes).map_err(|e| ProposalError::Encoding(e.to_string()))
    }
}

/// The eleven proposal types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    GrantRank,
    DemoteRank,
    ChangeAuthority,
    SetVotingPeriod,
    SetQuorumBps,
    SetOrderDelay,
    SetExecutionDelay,
    SetInviteExpiry,
    BlockOrder,
    TransferFunds,
    ResetFeeExemption,
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GrantRank => "grant_rank",
            Self::DemoteRank => "demote_rank",
            Self::ChangeAuthority => "change_authority",
            Self::SetVotingPeriod => "set_voting_period",
            Self::SetQuorumBps => "set_quorum_bps",
            Self::SetOrderDelay => "set_order_delay",
            Self::SetExecutionDelay => "set_execution_delay",
            Self::SetInviteExpiry => "set_invite_expiry",
            Self::BlockOrder => "block_order",
            Self::TransferFunds => "transfer_funds",
            Self::ResetFeeExemption => "reset_fee_exemption",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ballot {
    Yes,
    No,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    Succeeded,
    Failed(FailureReason),
}

impl ProposalOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ProposalOutcome::Succeeded)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalState {
    /// Voting window open (`start..=end`).
    Active,
    /// Window closed, not yet finalized.
    Ended,
    Finalized(ProposalOutcome),
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub action: ProposalAction,
    pub proposer: MemberId,
    /// Ledger index voting weight is read at.
    pub snapshot: LedgerIndex,
    pub start: Timestamp,
    pub end: Timestamp,
    pub yes: u128,
    pub no: u128,
    /// Set exactly once, by finalization.
    pub outcome: Option<ProposalOutcome>,
}

impl Proposal {
    pub fn state(&self, now: Timestamp) -> ProposalState {
        match self.outcome {
            Some(outcome) => ProposalState::Finalized(outcome),
            None if now <= self.end => ProposalState::Active,
            None => ProposalState::Ended,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_some_and(|o| o.succeeded())
    }

    pub fn votes_cast(&self) -> u128 {
        self.yes + self.no
    }
}
