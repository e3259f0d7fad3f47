//! Rank-based guild governance.
//!
//! [`Guild`] wires the membership registry, the authorization gateway, the
//! order engine and the proposal engine together the way a host ledger
//! would: the gateway owns the registry, and both engines reach it only
//! through role-checked calls. Treasury custody and fee bookkeeping stay
//! with the host, plugged in as [`Treasury`] and [`FeeLedger`].

pub mod config;
pub mod error;
pub mod event;
pub mod guild;

pub use config::{GenesisMember, GuildConfig, Principals};
pub use error::GuildError;
pub use event::GuildEvent;
pub use crate::guild::{Guild, GuildSnapshot};

pub use guild_gateway::{FeeLedger, Treasury};
