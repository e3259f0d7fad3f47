use guild_gateway::GatewayError;
use guild_registry::RegistryError;
use guild_types::{ErrorKind, Identity, MemberId, OrderId, Rank, Timestamp};
use thiserror::Error;

use crate::order::OrderKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0} is not bound to any member")]
    NotAMember(Identity),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("member {target} already has outstanding order {order}")]
    TargetHasOutstandingOrder { target: MemberId, order: OrderId },

    #[error("order {0} was already blocked")]
    AlreadyBlocked(OrderId),

    #[error("order {0} was already executed")]
    AlreadyExecuted(OrderId),

    #[error("{new_rank} is not a promotion from {current}")]
    NotAPromotion { current: Rank, new_rank: Rank },

    #[error("issuer at {issuer_rank} may grant at most two levels below itself, not {new_rank}")]
    ExceedsIssuerCeiling { issuer_rank: Rank, new_rank: Rank },

    #[error("issuer at {issuer_rank} lacks seniority over target at {target_rank}")]
    InsufficientSeniority { issuer_rank: Rank, target_rank: Rank },

    #[error("identity {0} is already bound to a member")]
    IdentityAlreadyBound(Identity),

    #[error("identity {0:?} is malformed")]
    InvalidIdentity(Identity),

    #[error("member {issuer} already holds {limit} outstanding orders")]
    QuotaExceeded { issuer: MemberId, limit: u32 },

    #[error("blocker at {blocker_rank} lacks veto seniority over issuer at {issuer_rank}")]
    VetoSeniority { blocker_rank: Rank, issuer_rank: Rank },

    #[error("order {order} is a {actual}, expected {expected}")]
    WrongOrderKind {
        order: OrderId,
        actual: OrderKind,
        expected: &'static str,
    },

    #[error("only the target of order {0} may accept it")]
    NotTarget(OrderId),

    #[error("only the issuer of order {0} may rescind it")]
    NotIssuer(OrderId),

    #[error("{0} is not the governing engine")]
    NotGovernance(Identity),

    #[error("order {order} is timelocked until {execute_after}")]
    TooEarly { order: OrderId, execute_after: Timestamp },

    #[error("veto window for order {order} closed at {execute_after}")]
    VetoWindowClosed { order: OrderId, execute_after: Timestamp },

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAMember(_) | Self::NotTarget(_) | Self::NotIssuer(_) | Self::NotGovernance(_) => {
                ErrorKind::Authorization
            }
            Self::OrderNotFound(_) => ErrorKind::NotFound,
            Self::TargetHasOutstandingOrder { .. }
            | Self::AlreadyBlocked(_)
            | Self::AlreadyExecuted(_)
            | Self::IdentityAlreadyBound(_) => ErrorKind::StateConflict,
            Self::NotAPromotion { .. }
            | Self::ExceedsIssuerCeiling { .. }
            | Self::InsufficientSeniority { .. }
            | Self::InvalidIdentity(_)
            | Self::WrongOrderKind { .. } => ErrorKind::Validation,
            Self::QuotaExceeded { .. } | Self::VetoSeniority { .. } => ErrorKind::QuotaExceeded,
            Self::TooEarly { .. } | Self::VetoWindowClosed { .. } => ErrorKind::Timing,
            Self::Registry(e) => e.kind(),
            Self::Gateway(e) => e.kind(),
        }
    }
}
