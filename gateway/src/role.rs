//! Caller roles and the role → principal capability table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use guild_types::Identity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallerRole {
    OrderEngine,
    ProposalEngine,
    InviteService,
}

impl CallerRole {
    pub fn permits(&self, operation: Operation) -> bool {
        use Operation::*;
        match self {
            CallerRole::OrderEngine => matches!(operation, SetRank | SetAuthority),
            CallerRole::ProposalEngine => !matches!(operation, AddMember),
            CallerRole::InviteService => matches!(operation, AddMember),
        }
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallerRole::OrderEngine => "order_engine",
            CallerRole::ProposalEngine => "proposal_engine",
            CallerRole::InviteService => "invite_service",
        };
        f.write_str(name)
    }
}

/// Mutations the gateway forwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    SetRank,
    SetAuthority,
    AddMember,
    SetParam,
    TransferFunds,
    SetActive,
    ResetFeeExemption,
    Rebind,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SetRank => "set_rank",
            Operation::SetAuthority => "set_authority",
            Operation::AddMember => "add_member",
            Operation::SetParam => "set_param",
            Operation::TransferFunds => "transfer_funds",
            Operation::SetActive => "set_active",
            Operation::ResetFeeExemption => "reset_fee_exemption",
            Operation::Rebind => "rebind",
        };
        f.write_str(name)
    }
}

/// Which principal currently holds each role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    bindings: HashMap<CallerRole, Identity>,
}

impl CapabilityTable {
    pub fn new(order_engine: Identity, proposal_engine: Identity, invite_service: Identity) -> Self {
        let bindings = HashMap::from([
            (CallerRole::OrderEngine, order_engine),
            (CallerRole::ProposalEngine, proposal_engine),
            (CallerRole::InviteService, invite_service),
        ]);
        Self { bindings }
    }

    pub fn principal(&self, role: CallerRole) -> Option<&Identity> {
        self.bindings.get(&role)
    }

    pub fn is_bound(&self, role: CallerRole, caller: &Identity) -> bool {
        self.principal(role) == Some(caller)
    }

    /// Replace the principal for `role`, returning the previous one.
    pub fn bind(&mut self, role: CallerRole, principal: Identity) -> Option<Identity> {
        self.bindings.insert(role, principal)
    }
}
