//! Timelocked hierarchical orders.
//!
//! A senior member issues an order against a junior one; the order waits out
//! the `order_delay` timelock during which a sufficiently senior member may
//! veto it and the issuer may rescind it. Afterwards a promotion grant is
//! accepted by its target, while demotions and authority changes are
//! executed by anyone.
//!
//! ```text
//!            accept / execute (not before execute_after)
//!   Pending ─────────────────────────────────────────────▶ Executed
//!      │
//!      └──── veto (before execute_after) / rescind / governance block ──▶ Blocked
//! ```
//!
//! Both outcomes are terminal. Each target holds at most one outstanding
//! order, and each issuer's concurrent orders are capped by
//! `order_limit_of_rank`.

pub mod engine;
pub mod error;
pub mod event;
pub mod order;

pub use engine::OrderEngine;
pub use error::OrderError;
pub use event::{OrderEffect, OrderEvent};
pub use order::{Blocker, OrderAction, OrderKind, OrderStatus, OrderTransition, PendingOrder};
