//! Notifications emitted by registry mutations.

use guild_types::{GovernableParam, Identity, MemberId, Rank};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    MemberAdded {
        member: MemberId,
        identity: Identity,
        rank: Rank,
    },
    RankChanged {
        member: MemberId,
        old: Rank,
        new: Rank,
    },
    AuthorityChanged {
        member: MemberId,
        old: Identity,
        new: Identity,
    },
    MemberActivated {
        member: MemberId,
    },
    MemberDeactivated {
        member: MemberId,
    },
    ParamChanged {
        param: GovernableParam,
        old: u64,
        new: u64,
    },
}
