//! Fundamental types for the guild governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! member/order/proposal identifiers, controlling identities, the ten-level rank
//! ladder, timestamps, governance parameters, and the stable error taxonomy.

pub mod error;
pub mod identity;
pub mod ids;
pub mod params;
pub mod rank;
pub mod time;

pub use error::{ErrorKind, ParseRankError};
pub use identity::Identity;
pub use ids::{MemberId, OrderId, ProposalId, TokenId};
pub use params::{GovernableParam, GovernanceParams};
pub use rank::Rank;
pub use time::{LedgerIndex, Timestamp};
