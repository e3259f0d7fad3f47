use guild_types::{ErrorKind, GovernableParam, Identity, LedgerIndex, MemberId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("caller {0} is not the registry controller")]
    Unauthorized(Identity),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("no member is bound to identity {0}")]
    IdentityNotBound(Identity),

    #[error("identity {identity} is already bound to member {member}")]
    IdentityAlreadyBound { identity: Identity, member: MemberId },

    #[error("identity {0:?} is malformed")]
    InvalidIdentity(Identity),

    #[error("{param} = {value} outside bounds [{min}, {max}]")]
    ParamOutOfBounds {
        param: GovernableParam,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("ledger index {index} precedes last checkpoint at {last}")]
    NonMonotonicIndex { last: LedgerIndex, index: LedgerIndex },
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Authorization,
            Self::MemberNotFound(_) | Self::IdentityNotBound(_) => ErrorKind::NotFound,
            Self::IdentityAlreadyBound { .. } => ErrorKind::StateConflict,
            Self::InvalidIdentity(_) | Self::ParamOutOfBounds { .. } => ErrorKind::Validation,
            Self::NonMonotonicIndex { .. } => ErrorKind::Timing,
        }
    }
}
