//! Membership registry.
//!
//! Holds member records and the time-indexed voting-power ledger. Reads are
//! open to anyone; every mutation names its caller and is accepted only from
//! the single controller identity fixed at construction (the authorization
//! gateway).
//!
//! Voting power is `2^rank_index` while a member is active and zero while it
//! is inactive. The ledger keeps one append-only checkpoint trail per member
//! plus a global trail whose value at every index equals the sum of the
//! member trails at that index.

pub mod checkpoint;
pub mod error;
pub mod event;
pub mod limits;
pub mod member;
pub mod registry;

pub use checkpoint::{Checkpoint, CheckpointTrail};
pub use error::RegistryError;
pub use event::RegistryEvent;
pub use limits::{
    invite_allowance_of_rank, order_limit_of_rank, proposal_limit_of_rank,
    voting_power_of_rank,
};
pub use member::Member;
pub use registry::MembershipRegistry;
