//! The guild facade: one gateway, one order engine, one proposal engine.

use std::path::Path;

use guild_gateway::{
    AuthorizationGateway, CallerRole, CapabilityTable, FeeLedger, GatewaySnapshot, Treasury,
};
use guild_governance::{Ballot, ProposalAction, ProposalEngine, ProposalOutcome};
use guild_orders::{OrderEffect, OrderEngine};
use guild_registry::MembershipRegistry;
use guild_types::{Identity, MemberId, OrderId, ProposalId, Rank, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::GuildConfig;
use crate::error::GuildError;
use crate::event::GuildEvent;

pub struct Guild {
    gateway: AuthorizationGateway,
    orders: OrderEngine,
    proposals: ProposalEngine,
}

/// Persisted guild state. Collaborators are re-attached on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuildSnapshot {
    pub gateway: GatewaySnapshot,
    pub orders: OrderEngine,
    pub proposals: ProposalEngine,
}

impl Guild {
    /// Build a guild from configuration, checkpointing genesis members at `now`.
    pub fn new(
        config: &GuildConfig,
        treasury: Box<dyn Treasury>,
        fees: Box<dyn FeeLedger>,
        now: Timestamp,
    ) -> Result<Self, GuildError> {
        config.validate()?;
        let principals = &config.principals;
        let genesis = config.genesis_members()?;
        let registry =
            MembershipRegistry::new(principals.gateway.clone(), config.params(), &genesis, now)?;
        let capabilities = CapabilityTable::new(
            principals.order_engine.clone(),
            principals.proposal_engine.clone(),
            principals.invite_service.clone(),
        );
        let gateway = AuthorizationGateway::new(
            principals.gateway.clone(),
            registry,
            capabilities,
            treasury,
            fees,
        )?;
        tracing::info!(
            members = genesis.len(),
            gateway = %principals.gateway,
            %now,
            "guild initialised"
        );
        Ok(Self {
            gateway,
            orders: OrderEngine::new(principals.order_engine.clone()),
            proposals: ProposalEngine::new(principals.proposal_engine.clone()),
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn gateway(&self) -> &AuthorizationGateway {
        &self.gateway
    }

    pub fn registry(&self) -> &MembershipRegistry {
        self.gateway.registry()
    }

    pub fn orders(&self) -> &OrderEngine {
        &self.orders
    }

    pub fn proposals(&self) -> &ProposalEngine {
        &self.proposals
    }

    // ── Membership ──────────────────────────────────────────────────────

    /// Admit a member on behalf of the invite service. The service's own
    /// invite bookkeeping (allowances, expiry) stays with the host.
    pub fn admit_member(
        &mut self,
        caller: &Identity,
        identity: Identity,
        now: Timestamp,
    ) -> Result<MemberId, GuildError> {
        Ok(self
            .gateway
            .add_member(CallerRole::InviteService, caller, identity, now)?)
    }

    // ── Orders ──────────────────────────────────────────────────────────

    pub fn issue_promotion_grant(
        &mut self,
        caller: &Identity,
        target: MemberId,
        new_rank: Rank,
        now: Timestamp,
    ) -> Result<OrderId, GuildError> {
        Ok(self
            .orders
            .issue_promotion_grant(&self.gateway, caller, target, new_rank, now)?)
    }

    pub fn issue_demotion_order(
        &mut self,
        caller: &Identity,
        target: MemberId,
        now: Timestamp,
    ) -> Result<OrderId, GuildError> {
        Ok(self.orders.issue_demotion_order(&self.gateway, caller, target, now)?)
    }

    pub fn issue_authority_order(
        &mut self,
        caller: &Identity,
        target: MemberId,
        new_identity: Identity,
        now: Timestamp,
    ) -> Result<OrderId, GuildError> {
        Ok(self
            .orders
            .issue_authority_order(&self.gateway, caller, target, new_identity, now)?)
    }

    pub fn accept_promotion_grant(
        &mut self,
        caller: &Identity,
        order: OrderId,
        now: Timestamp,
    ) -> Result<(), GuildError> {
        Ok(self
            .orders
            .accept_promotion_grant(&mut self.gateway, caller, order, now)?)
    }

    pub fn execute_order(&mut self, order: OrderId, now: Timestamp) -> Result<OrderEffect, GuildError> {
        Ok(self.orders.execute_order(&mut self.gateway, order, now)?)
    }

    pub fn block_order(
        &mut self,
        caller: &Identity,
        order: OrderId,
        now: Timestamp,
    ) -> Result<(), GuildError> {
        Ok(self.orders.block_order(&self.gateway, caller, order, now)?)
    }

    pub fn rescind_order(&mut self, caller: &Identity, order: OrderId) -> Result<(), GuildError> {
        Ok(self.orders.rescind_order(&self.gateway, caller, order)?)
    }

    // ── Proposals ───────────────────────────────────────────────────────

    pub fn create_proposal(
        &mut self,
        caller: &Identity,
        action: ProposalAction,
        now: Timestamp,
    ) -> Result<ProposalId, GuildError> {
        Ok(self
            .proposals
            .create_proposal(&self.gateway, &self.orders, caller, action, now)?)
    }

    pub fn cast_vote(
        &mut self,
        caller: &Identity,
        proposal: ProposalId,
        ballot: Ballot,
        now: Timestamp,
    ) -> Result<u128, GuildError> {
        Ok(self
            .proposals
            .cast_vote(&self.gateway, caller, proposal, ballot, now)?)
    }

    pub fn finalize_proposal(
        &mut self,
        proposal: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalOutcome, GuildError> {
        Ok(self
            .proposals
            .finalize_proposal(&mut self.gateway, &mut self.orders, proposal, now)?)
    }

    pub fn sync_member_activity(&mut self, member: MemberId, now: Timestamp) -> Result<bool, GuildError> {
        Ok(self
            .proposals
            .sync_member_activity(&mut self.gateway, member, now)?)
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Take every buffered notification: registry, then orders, then proposals.
    pub fn drain_events(&mut self) -> Vec<GuildEvent> {
        let mut events: Vec<GuildEvent> = self
            .gateway
            .drain_registry_events()
            .into_iter()
            .map(GuildEvent::from)
            .collect();
        events.extend(self.orders.drain_events().into_iter().map(GuildEvent::from));
        events.extend(self.proposals.drain_events().into_iter().map(GuildEvent::from));
        events
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> GuildSnapshot {
        GuildSnapshot {
            gateway: self.gateway.snapshot(),
            orders: self.orders.clone(),
            proposals: self.proposals.clone(),
        }
    }

    /// Encode the full guild state. Undrained events are not included.
    pub fn save_state(&self) -> Result<Vec<u8>, GuildError> {
        bincode::serialize(&self.snapshot()).map_err(|e| GuildError::Snapshot(e.to_string()))
    }

    pub fn load_state(
        bytes: &[u8],
        treasury: Box<dyn Treasury>,
        fees: Box<dyn FeeLedger>,
    ) -> Result<Self, GuildError> {
        let snapshot: GuildSnapshot =
            bincode::deserialize(bytes).map_err(|e| GuildError::Snapshot(e.to_string()))?;
        let gateway = AuthorizationGateway::from_snapshot(snapshot.gateway, treasury, fees)?;
        tracing::info!(
            members = gateway.registry().member_count(),
            "guild restored from snapshot"
        );
        Ok(Self {
            gateway,
            orders: snapshot.orders,
            proposals: snapshot.proposals,
        })
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), GuildError> {
        let bytes = self.save_state()?;
        std::fs::write(path.as_ref(), &bytes)?;
        tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "guild state written");
        Ok(())
    }

    pub fn load_from_path(
        path: impl AsRef<Path>,
        treasury: Box<dyn Treasury>,
        fees: Box<dyn FeeLedger>,
    ) -> Result<Self, GuildError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::load_state(&bytes, treasury, fees)
    }
}
