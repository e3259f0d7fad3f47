//! The membership registry: records, identity bijection, and voting-power ledger.

use crate::checkpoint::CheckpointTrail;
use crate::error::RegistryError;
use crate::event::RegistryEvent;
use crate::member::Member;
use guild_types::{GovernableParam, GovernanceParams, Identity, LedgerIndex, MemberId, Rank, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipRegistry {
    /// The only identity allowed to mutate the registry.
    controller: Identity,
    members: BTreeMap<MemberId, Member>,
    by_identity: HashMap<Identity, MemberId>,
    power: HashMap<MemberId, CheckpointTrail>,
    total: CheckpointTrail,
    params: GovernanceParams,
    next_id: MemberId,
    #[serde(skip)]
    events: Vec<RegistryEvent>,
}

impl MembershipRegistry {
    /// Build a registry seeded with genesis members (ids allocated from 1 in order).
    pub fn new(
        controller: Identity,
        params: GovernanceParams,
        genesis: &[(Identity, Rank)],
        now: Timestamp,
    ) -> Result<Self, RegistryError> {
        if let Some((param, value)) = params.first_out_of_bounds() {
            let (min, max) = param.bounds();
            return Err(RegistryError::ParamOutOfBounds { param, value, min, max });
        }

        let mut registry = Self {
            controller,
            members: BTreeMap::new(),
            by_identity: HashMap::new(),
            power: HashMap::new(),
            total: CheckpointTrail::new(),
            params,
            next_id: MemberId::new(1),
            events: Vec::new(),
        };
        for (identity, rank) in genesis {
            registry.check_bindable(identity)?;
            registry.insert_member(identity.clone(), *rank, now)?;
        }
        tracing::info!(members = registry.members.len(), "registry initialised from genesis");
        Ok(registry)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn controller(&self) -> &Identity {
        &self.controller
    }

    pub fn member(&self, id: MemberId) -> Result<&Member, RegistryError> {
        self.members.get(&id).ok_or(RegistryError::MemberNotFound(id))
    }

    pub fn member_by_identity(&self, identity: &Identity) -> Result<&Member, RegistryError> {
        self.by_identity
            .get(identity)
            .and_then(|id| self.members.get(id))
            .ok_or_else(|| RegistryError::IdentityNotBound(identity.clone()))
    }

    pub fn is_bound(&self, identity: &Identity) -> bool {
        self.by_identity.contains_key(identity)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// A member's voting power at or before `index`; zero for unknown members.
    pub fn voting_power_at(&self, member: MemberId, index: LedgerIndex) -> u128 {
        self.power.get(&member).map(|t| t.value_at(index)).unwrap_or(0)
    }

    pub fn current_voting_power(&self, member: MemberId) -> u128 {
        self.power.get(&member).map(|t| t.latest()).unwrap_or(0)
    }

    pub fn total_voting_power_at(&self, index: LedgerIndex) -> u128 {
        self.total.value_at(index)
    }

    pub fn current_total_voting_power(&self) -> u128 {
        self.total.latest()
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn param(&self, param: GovernableParam) -> u64 {
        self.params.get(param)
    }

    /// Take every notification buffered since the last drain.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Controller-only mutations ───────────────────────────────────────

    /// Change a member's rank. No-op if unchanged.
    ///
    /// The ledger only moves while the member is active; an inactive member
    /// keeps contributing zero whatever its rank.
    pub fn set_rank(
        &mut self,
        caller: &Identity,
        id: MemberId,
        rank: Rank,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        let member = self.member(id)?;
        let old = member.rank;
        if old == rank {
            tracing::debug!(member = %id, %rank, "rank unchanged");
            return Ok(());
        }
        let active = member.active;

        if active {
            self.write_power(id, crate::limits::voting_power_of_rank(rank), now.ledger_index())?;
        }
        if let Some(member) = self.members.get_mut(&id) {
            member.rank = rank;
        }
        tracing::info!(member = %id, %old, new = %rank, active, "rank changed");
        self.events.push(RegistryEvent::RankChanged { member: id, old, new: rank });
        Ok(())
    }

    /// Rebind a member to a new controlling identity.
    pub fn set_authority(
        &mut self,
        caller: &Identity,
        id: MemberId,
        identity: Identity,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        self.member(id)?;
        self.check_bindable(&identity)?;

        let Some(member) = self.members.get_mut(&id) else {
            return Err(RegistryError::MemberNotFound(id));
        };
        let old = std::mem::replace(&mut member.identity, identity.clone());
        self.by_identity.remove(&old);
        self.by_identity.insert(identity.clone(), id);
        tracing::info!(member = %id, %old, new = %identity, "authority changed");
        self.events.push(RegistryEvent::AuthorityChanged { member: id, old, new: identity });
        Ok(())
    }

    /// Admit a new member at the default rank.
    pub fn add_member(
        &mut self,
        caller: &Identity,
        identity: Identity,
        now: Timestamp,
    ) -> Result<MemberId, RegistryError> {
        self.authorize(caller)?;
        self.check_bindable(&identity)?;
        self.insert_member(identity, Rank::DEFAULT, now)
    }

    /// Toggle participation, zeroing or restoring the member's ledger contribution.
    pub fn set_active(
        &mut self,
        caller: &Identity,
        id: MemberId,
        active: bool,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        let member = self.member(id)?;
        if member.active == active {
            tracing::debug!(member = %id, active, "active flag unchanged");
            return Ok(());
        }
        let power = if active {
            crate::limits::voting_power_of_rank(member.rank)
        } else {
            0
        };

        self.write_power(id, power, now.ledger_index())?;
        if let Some(member) = self.members.get_mut(&id) {
            member.active = active;
        }
        if active {
            tracing::info!(member = %id, "member activated");
            self.events.push(RegistryEvent::MemberActivated { member: id });
        } else {
            tracing::info!(member = %id, "member deactivated");
            self.events.push(RegistryEvent::MemberDeactivated { member: id });
        }
        Ok(())
    }

    /// Set a governance parameter, returning the previous value.
    pub fn set_param(
        &mut self,
        caller: &Identity,
        param: GovernableParam,
        value: u64,
    ) -> Result<u64, RegistryError> {
        self.authorize(caller)?;
        if !param.accepts(value) {
            let (min, max) = param.bounds();
            return Err(RegistryError::ParamOutOfBounds { param, value, min, max });
        }
        let old = self.params.replace(param, value);
        tracing::info!(%param, old, new = value, "governance parameter changed");
        self.events.push(RegistryEvent::ParamChanged { param, old, new: value });
        Ok(old)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn authorize(&self, caller: &Identity) -> Result<(), RegistryError> {
        if caller != &self.controller {
            tracing::warn!(%caller, "registry mutation rejected: not the controller");
            return Err(RegistryError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn check_bindable(&self, identity: &Identity) -> Result<(), RegistryError> {
        if !identity.is_valid() {
            return Err(RegistryError::InvalidIdentity(identity.clone()));
        }
        if let Some(member) = self.by_identity.get(identity) {
            return Err(RegistryError::IdentityAlreadyBound {
                identity: identity.clone(),
                member: *member,
            });
        }
        Ok(())
    }

    fn insert_member(
        &mut self,
        identity: Identity,
        rank: Rank,
        now: Timestamp,
    ) -> Result<MemberId, RegistryError> {
        let id = self.next_id;
        let member = Member {
            id,
            rank,
            identity: identity.clone(),
            joined_at: now,
            active: true,
        };
        self.write_power(id, member.voting_power(), now.ledger_index())?;
        self.members.insert(id, member);
        self.by_identity.insert(identity.clone(), id);
        self.next_id = id.next();
        tracing::info!(member = %id, %identity, %rank, "member added");
        self.events.push(RegistryEvent::MemberAdded { member: id, identity, rank });
        Ok(id)
    }

    /// Move one member's ledger entry to `power` and shift the global total by the delta.
    ///
    /// Both trails are checked before either is written.
    fn write_power(
        &mut self,
        id: MemberId,
        power: u128,
        index: LedgerIndex,
    ) -> Result<(), RegistryError> {
        self.total.check_writable(index)?;
        if let Some(trail) = self.power.get(&id) {
            trail.check_writable(index)?;
        }

        let trail = self.power.entry(id).or_default();
        let previous = trail.latest();
        trail.record(index, power)?;
        let total = self.total.latest().saturating_sub(previous) + power;
        self.total.record(index, total)
    }
}
