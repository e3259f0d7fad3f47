//! Authorization gateway.
//!
//! The membership registry accepts mutations from exactly one identity: this
//! gateway. The gateway in turn keeps a role → principal capability table and
//! forwards a call only when the caller is the principal currently bound to a
//! role that is permitted to perform the operation.
//!
//! | Operation | Permitted roles |
//! |---|---|
//! | `set_rank`, `set_authority` | OrderEngine, ProposalEngine |
//! | `set_param`, `transfer_funds`, `reset_fee_exemption`, `set_active` | ProposalEngine |
//! | `add_member` | InviteService |
//!
//! Rebinding a role to a new principal is itself a ProposalEngine-only
//! operation, so engines can be replaced by governance without ever
//! re-pointing the registry's controller.

pub mod collaborator;
pub mod error;
pub mod gateway;
pub mod role;

pub use collaborator::{CollaboratorError, FeeLedger, Treasury};
pub use error::GatewayError;
pub use gateway::{AuthorizationGateway, GatewaySnapshot};
pub use role::{CallerRole, CapabilityTable, Operation};
