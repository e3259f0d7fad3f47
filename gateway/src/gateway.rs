//! The gateway: owns the registry and forwards role-checked mutations.

use crate::collaborator::{FeeLedger, Treasury};
use crate::error::GatewayError;
use crate::role::{CallerRole, CapabilityTable, Operation};
use guild_registry::{MembershipRegistry, RegistryEvent};
use guild_types::{GovernableParam, Identity, MemberId, Rank, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

pub struct AuthorizationGateway {
    /// Identity the registry recognises as its controller.
    principal: Identity,
    registry: MembershipRegistry,
    capabilities: CapabilityTable,
    treasury: Box<dyn Treasury>,
    fees: Box<dyn FeeLedger>,
}

/// Serializable gateway state; collaborators are re-attached on restore.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewaySnapshot {
    pub principal: Identity,
    pub registry: MembershipRegistry,
    pub capabilities: CapabilityTable,
}

impl AuthorizationGateway {
    pub fn new(
        principal: Identity,
        registry: MembershipRegistry,
        capabilities: CapabilityTable,
        treasury: Box<dyn Treasury>,
        fees: Box<dyn FeeLedger>,
    ) -> Result<Self, GatewayError> {
        if registry.controller() != &principal {
            return Err(GatewayError::ControllerMismatch {
                controller: registry.controller().clone(),
                principal,
            });
        }
        Ok(Self {
            principal,
            registry,
            capabilities,
            treasury,
            fees,
        })
    }

    pub fn from_snapshot(
        snapshot: GatewaySnapshot,
        treasury: Box<dyn Treasury>,
        fees: Box<dyn FeeLedger>,
    ) -> Result<Self, GatewayError> {
        Self::new(
            snapshot.principal,
            snapshot.registry,
            snapshot.capabilities,
            treasury,
            fees,
        )
    }

    pub fn snapshot(&self) -> GatewaySnapshot {
        GatewaySnapshot {
            principal: self.principal.clone(),
            registry: self.registry.clone(),
            capabilities: self.capabilities.clone(),
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn principal(&self) -> &Identity {
        &self.principal
    }

    /// Read-only registry access for engines and external services.
    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn fee_ledger(&self) -> &dyn FeeLedger {
        self.fees.as_ref()
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub fn is_bound(&self, role: CallerRole, caller: &Identity) -> bool {
        self.capabilities.is_bound(role, caller)
    }

    pub fn drain_registry_events(&mut self) -> Vec<RegistryEvent> {
        self.registry.drain_events()
    }

    // ── Forwarded mutations ─────────────────────────────────────────────

    pub fn set_rank(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        member: MemberId,
        rank: Rank,
        now: Timestamp,
    ) -> Result<(), GatewayError> {
        self.guard(role, caller, Operation::SetRank)?;
        Ok(self.registry.set_rank(&self.principal, member, rank, now)?)
    }

    pub fn set_authority(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        member: MemberId,
        identity: Identity,
    ) -> Result<(), GatewayError> {
        self.guard(role, caller, Operation::SetAuthority)?;
        Ok(self.registry.set_authority(&self.principal, member, identity)?)
    }

    pub fn add_member(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        identity: Identity,
        now: Timestamp,
    ) -> Result<MemberId, GatewayError> {
        self.guard(role, caller, Operation::AddMember)?;
        Ok(self.registry.add_member(&self.principal, identity, now)?)
    }

    pub fn set_param(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        param: GovernableParam,
        value: u64,
    ) -> Result<u64, GatewayError> {
        self.guard(role, caller, Operation::SetParam)?;
        Ok(self.registry.set_param(&self.principal, param, value)?)
    }

    pub fn set_active(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        member: MemberId,
        active: bool,
        now: Timestamp,
    ) -> Result<(), GatewayError> {
        self.guard(role, caller, Operation::SetActive)?;
        Ok(self.registry.set_active(&self.principal, member, active, now)?)
    }

    pub fn transfer_funds(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        token: &TokenId,
        recipient: &Identity,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), GatewayError> {
        self.guard(role, caller, Operation::TransferFunds)?;
        self.treasury.transfer(token, recipient, amount, now)?;
        tracing::info!(%token, %recipient, amount, "treasury transfer forwarded");
        Ok(())
    }

    pub fn reset_fee_exemption(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        member: MemberId,
        now: Timestamp,
    ) -> Result<(), GatewayError> {
        self.guard(role, caller, Operation::ResetFeeExemption)?;
        self.registry.member(member)?;
        self.fees.reset_exemption(member, now)?;
        tracing::info!(%member, "fee exemption reset forwarded");
        Ok(())
    }

    /// Swap the principal bound to `target`. Only the governing engine may do this.
    pub fn rebind(
        &mut self,
        role: CallerRole,
        caller: &Identity,
        target: CallerRole,
        principal: Identity,
    ) -> Result<Option<Identity>, GatewayError> {
        self.guard(role, caller, Operation::Rebind)?;
        let previous = self.capabilities.bind(target, principal.clone());
        tracing::info!(role = %target, %principal, "gateway role rebound");
        Ok(previous)
    }

    fn guard(
        &self,
        role: CallerRole,
        caller: &Identity,
        operation: Operation,
    ) -> Result<(), GatewayError> {
        if !role.permits(operation) {
            tracing::warn!(%role, %caller, %operation, "operation not permitted for role");
            return Err(GatewayError::RoleNotPermitted { role, operation });
        }
        if !self.capabilities.is_bound(role, caller) {
            tracing::warn!(%role, %caller, %operation, "caller is not bound to role");
            return Err(GatewayError::NotBound {
                role,
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}
