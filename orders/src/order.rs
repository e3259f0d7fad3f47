//! Order records and the order state machine.

use crate::error::OrderError;
use guild_types::{Identity, MemberId, OrderId, ProposalId, Rank, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What an order does once it goes through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    /// Raise the target to `new_rank`; the target must accept it.
    PromoteGrant { new_rank: Rank },
    /// Lower the target by one rank, floored at the lowest.
    Demote,
    /// Rebind the target to a new controlling identity.
    AuthorityChange { new_identity: Identity },
}

impl OrderAction {
    pub fn kind(&self) -> OrderKind {
        match self {
            OrderAction::PromoteGrant { .. } => OrderKind::PromoteGrant,
            OrderAction::Demote => OrderKind::Demote,
            OrderAction::AuthorityChange { .. } => OrderKind::AuthorityChange,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    PromoteGrant,
    Demote,
    AuthorityChange,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderKind::PromoteGrant => "promote_grant",
            OrderKind::Demote => "demote",
            OrderKind::AuthorityChange => "authority_change",
        };
        f.write_str(name)
    }
}

/// Who stopped an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocker {
    /// Vetoed by a senior member.
    Member(MemberId),
    /// Rescinded by its own issuer.
    Issuer(MemberId),
    /// Blocked by a passed governance proposal.
    Governance(ProposalId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Blocked(Blocker),
    Executed,
}

/// Every way an order can leave `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderTransition {
    Execute,
    Block(Blocker),
}

impl OrderStatus {
    /// The single transition function: only `Pending` moves, terminal
    /// states reject every action.
    pub fn apply(&self, order: OrderId, transition: OrderTransition) -> Result<OrderStatus, OrderError> {
        match (self, transition) {
            (OrderStatus::Pending, OrderTransition::Execute) => Ok(OrderStatus::Executed),
            (OrderStatus::Pending, OrderTransition::Block(by)) => Ok(OrderStatus::Blocked(by)),
            (OrderStatus::Blocked(_), _) => Err(OrderError::AlreadyBlocked(order)),
            (OrderStatus::Executed, _) => Err(OrderError::AlreadyExecuted(order)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: OrderId,
    pub action: OrderAction,
    pub issuer: MemberId,
    /// Issuer rank when the order was created. Fixes the veto threshold for
    /// the order's lifetime.
    pub issuer_rank: Rank,
    pub target: MemberId,
    pub created_at: Timestamp,
    pub execute_after: Timestamp,
    pub status: OrderStatus,
}

impl PendingOrder {
    pub fn kind(&self) -> OrderKind {
        self.action.kind()
    }

    /// Whether the timelock has elapsed at `now`.
    pub fn is_unlocked(&self, now: Timestamp) -> bool {
        now >= self.execute_after
    }
}
