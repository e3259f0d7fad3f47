use guild_gateway::GatewayError;
use guild_governance::ProposalError;
use guild_orders::OrderError;
use guild_registry::RegistryError;
use guild_types::{ErrorKind, ParseRankError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuildError {
    #[error("config error: {0}")]
    Config(String),

    #[error("genesis error: {0}")]
    Genesis(#[from] ParseRankError),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("proposal error: {0}")]
    Proposal(#[from] ProposalError),
}

impl GuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Genesis(_) | Self::Snapshot(_) => ErrorKind::Validation,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::StateConflict,
            Self::Registry(e) => e.kind(),
            Self::Gateway(e) => e.kind(),
            Self::Order(e) => e.kind(),
            Self::Proposal(e) => e.kind(),
        }
    }
}
