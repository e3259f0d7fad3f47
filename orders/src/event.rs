use guild_types::{Identity, MemberId, OrderId, ProposalId, Rank, Timestamp};
use serde::{Deserialize, Serialize};

use crate::order::OrderKind;

/// Resulting change applied when an order goes through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEffect {
    RankSet(Rank),
    /// Demotion of a member already at the lowest rank.
    AtFloor,
    AuthorityMoved(Identity),
    /// Authority change whose new identity was bound elsewhere during the timelock.
    IdentityTaken(Identity),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    Created {
        order: OrderId,
        kind: OrderKind,
        issuer: MemberId,
        target: MemberId,
        execute_after: Timestamp,
    },
    Blocked {
        order: OrderId,
        blocker: MemberId,
    },
    Rescinded {
        order: OrderId,
        issuer: MemberId,
    },
    GovernanceBlocked {
        order: OrderId,
        proposal: ProposalId,
    },
    Executed {
        order: OrderId,
        target: MemberId,
        effect: OrderEffect,
    },
}
