use guild_types::{Identity, MemberId, Rank, Timestamp};
use serde::{Deserialize, Serialize};

use crate::limits::voting_power_of_rank;

/// A member record. Members are never deleted, only deactivated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub rank: Rank,
    /// Controlling identity; the id↔identity mapping is a bijection.
    pub identity: Identity,
    pub joined_at: Timestamp,
    pub active: bool,
}

impl Member {
    /// Ledger contribution of this member right now.
    pub fn voting_power(&self) -> u128 {
        if self.active {
            voting_power_of_rank(self.rank)
        } else {
            0
        }
    }
}
