use crate::collaborator::CollaboratorError;
use crate::role::{CallerRole, Operation};
use guild_registry::RegistryError;
use guild_types::{ErrorKind, Identity};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("role {role} may not perform {operation}")]
    RoleNotPermitted { role: CallerRole, operation: Operation },

    #[error("{caller} is not the principal bound to {role}")]
    NotBound { role: CallerRole, caller: Identity },

    #[error("registry controller {controller} does not match gateway principal {principal}")]
    ControllerMismatch { controller: Identity, principal: Identity },

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoleNotPermitted { .. } | Self::NotBound { .. } | Self::ControllerMismatch { .. } => {
                ErrorKind::Authorization
            }
            Self::Registry(e) => e.kind(),
            Self::Collaborator(e) => e.kind,
        }
    }
}
