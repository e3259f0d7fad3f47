use guild_gateway::GatewayError;
use guild_orders::OrderError;
use guild_registry::RegistryError;
use guild_types::{ErrorKind, GovernableParam, Identity, MemberId, OrderId, ProposalId, Rank, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("{0} is not bound to any member")]
    NotAMember(Identity),

    #[error("proposer at {rank} is below the governing rank {required}")]
    BelowGoverningRank { rank: Rank, required: Rank },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("member {target} already has outstanding order {order}")]
    TargetHasOutstandingOrder { target: MemberId, order: OrderId },

    #[error("order {0} is no longer pending")]
    OrderNotPending(OrderId),

    #[error("identity {0} is already bound to a member")]
    IdentityAlreadyBound(Identity),

    #[error("identity {0:?} is malformed")]
    InvalidIdentity(Identity),

    #[error("{new_rank} is not a promotion from {current}")]
    NotAPromotion { current: Rank, new_rank: Rank },

    #[error("{new_rank} is not a demotion from {current}")]
    NotADemotion { current: Rank, new_rank: Rank },

    #[error("{param} = {value} outside bounds [{min}, {max}]")]
    ParamOutOfBounds {
        param: GovernableParam,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("transfer amount must be positive")]
    ZeroAmount,

    #[error("member {proposer} already holds {limit} open proposals")]
    QuotaExceeded { proposer: MemberId, limit: u32 },

    #[error("member {voter} already voted on proposal {proposal}")]
    AlreadyVoted { proposal: ProposalId, voter: MemberId },

    #[error("member {voter} had no voting power at the snapshot of proposal {proposal}")]
    NoVotingPower { proposal: ProposalId, voter: MemberId },

    #[error("proposal {0} is already finalized")]
    AlreadyFinalized(ProposalId),

    #[error("voting on proposal {proposal} opens at {start}")]
    VotingNotOpen { proposal: ProposalId, start: Timestamp },

    #[error("voting on proposal {proposal} closed at {end}")]
    VotingClosed { proposal: ProposalId, end: Timestamp },

    #[error("voting on proposal {proposal} runs until {end}")]
    VotingNotEnded { proposal: ProposalId, end: Timestamp },

    #[error("payload encoding: {0}")]
    Encoding(String),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Order(#[from] OrderError),
}

impl ProposalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAMember(_) | Self::BelowGoverningRank { .. } => ErrorKind::Authorization,
            Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::TargetHasOutstandingOrder { .. }
            | Self::OrderNotPending(_)
            | Self::IdentityAlreadyBound(_)
            | Self::AlreadyVoted { .. }
            | Self::AlreadyFinalized(_) => ErrorKind::StateConflict,
            Self::InvalidIdentity(_)
            | Self::NotAPromotion { .. }
            | Self::NotADemotion { .. }
            | Self::ParamOutOfBounds { .. }
            | Self::ZeroAmount
            | Self::NoVotingPower { .. }
            | Self::Encoding(_) => ErrorKind::Validation,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::VotingNotOpen { .. } | Self::VotingClosed { .. } | Self::VotingNotEnded { .. } => {
                ErrorKind::Timing
            }
            Self::Registry(e) => e.kind(),
            Self::Gateway(e) => e.kind(),
            Self::Order(e) => e.kind(),
        }
    }
}
