//! Governance parameters and their registry-defined bounds.
//!
//! Every field is governable through a parameter-change proposal. Bounds are
//! enforced both when a proposal is created and when the setter runs.

use serde::{Deserialize, Serialize};
use std::fmt;

const HOUR: u64 = 3_600;
const DAY: u64 = 24 * HOUR;

/// Basis points denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Enum of all parameters that can be changed by governance vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    VotingPeriod,
    QuorumBps,
    OrderDelay,
    /// Consumed by the treasury collaborator.
    ExecutionDelay,
    /// Consumed by the invite collaborator.
    InviteExpiry,
}

impl GovernableParam {
    pub const ALL: [GovernableParam; 5] = [
        GovernableParam::VotingPeriod,
        GovernableParam::QuorumBps,
        GovernableParam::OrderDelay,
        GovernableParam::ExecutionDelay,
        GovernableParam::InviteExpiry,
    ];

    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VotingPeriod => "voting_period_secs",
            Self::QuorumBps => "quorum_bps",
            Self::OrderDelay => "order_delay_secs",
            Self::ExecutionDelay => "execution_delay_secs",
            Self::InviteExpiry => "invite_expiry_secs",
        }
    }

    /// Inclusive `(min, max)` range a value must fall in.
    pub fn bounds(&self) -> (u64, u64) {
        match self {
            Self::VotingPeriod => (HOUR, 30 * DAY),
            Self::QuorumBps => (1, BPS_DENOMINATOR),
            Self::OrderDelay => (HOUR, 30 * DAY),
            Self::ExecutionDelay => (0, 30 * DAY),
            Self::InviteExpiry => (HOUR, 90 * DAY),
        }
    }

    pub fn accepts(&self, value: u64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for GovernableParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current values of every governable parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Length of a proposal's voting window in seconds.
    pub voting_period_secs: u64,
    /// Quorum as a fraction of snapshot total voting power (basis points).
    pub quorum_bps: u64,
    /// Timelock between issuing an order and its acceptance/execution.
    pub order_delay_secs: u64,
    pub execution_delay_secs: u64,
    pub invite_expiry_secs: u64,
}

impl GovernanceParams {
    pub fn get(&self, param: GovernableParam) -> u64 {
        match param {
            GovernableParam::VotingPeriod => self.voting_period_secs,
            GovernableParam::QuorumBps => self.quorum_bps,
            GovernableParam::OrderDelay => self.order_delay_secs,
            GovernableParam::ExecutionDelay => self.execution_delay_secs,
            GovernableParam::InviteExpiry => self.invite_expiry_secs,
        }
    }

    /// Store `value` and return the previous one. Bounds are the caller's concern.
    pub fn replace(&mut self, param: GovernableParam, value: u64) -> u64 {
        let slot = match param {
            GovernableParam::VotingPeriod => &mut self.voting_period_secs,
            GovernableParam::QuorumBps => &mut self.quorum_bps,
            GovernableParam::OrderDelay => &mut self.order_delay_secs,
            GovernableParam::ExecutionDelay => &mut self.execution_delay_secs,
            GovernableParam::InviteExpiry => &mut self.invite_expiry_secs,
        };
        std::mem::replace(slot, value)
    }

    /// First parameter whose value falls outside its bounds, if any.
    pub fn first_out_of_bounds(&self) -> Option<(GovernableParam, u64)> {
        GovernableParam::ALL
            .into_iter()
            .map(|p| (p, self.get(p)))
            .find(|(p, v)| !p.accepts(*v))
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_period_secs: 3 * DAY,
            quorum_bps: 2_000,
            order_delay_secs: 2 * DAY,
            execution_delay_secs: DAY,
            invite_expiry_secs: 7 * DAY,
        }
    }
}
