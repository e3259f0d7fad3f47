//! The order engine: issues, vetoes, rescinds and carries out timelocked orders.

use crate::error::OrderError;
use crate::event::{OrderEffect, OrderEvent};
use crate::order::{Blocker, OrderAction, OrderStatus, OrderTransition, PendingOrder};
use guild_gateway::{AuthorizationGateway, CallerRole};
use guild_registry::{order_limit_of_rank, Member};
use guild_types::{Identity, MemberId, OrderId, ProposalId, Rank, Timestamp};
use guild_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderEngine {
    /// Identity this engine presents to the gateway.
    principal: Identity,
    orders: BTreeMap<OrderId, PendingOrder>,
    /// Target → its single outstanding order.
    outstanding: HashMap<MemberId, OrderId>,
    /// Issuer → number of its orders still pending.
    active_counts: HashMap<MemberId, u32>,
    next_id: OrderId,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl OrderEngine {
    pub fn new(principal: Identity) -> Self {
        Self {
            principal,
            orders: BTreeMap::new(),
            outstanding: HashMap::new(),
            active_counts: HashMap::new(),
            next_id: OrderId::new(1),
            events: Vec::new(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn principal(&self) -> &Identity {
        &self.principal
    }

    pub fn order(&self, id: OrderId) -> Result<&PendingOrder, OrderError> {
        self.orders.get(&id).ok_or(OrderError::OrderNotFound(id))
    }

    pub fn outstanding_order_for(&self, target: MemberId) -> Option<OrderId> {
        self.outstanding.get(&target).copied()
    }

    pub fn active_order_count(&self, issuer: MemberId) -> u32 {
        self.active_counts.get(&issuer).copied().unwrap_or(0)
    }

    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Issuing ─────────────────────────────────────────────────────────

    /// Offer `target` a promotion to `new_rank`.
    ///
    /// `new_rank` must be above the target's current rank and at least two
    /// levels below the issuer's.
    pub fn issue_promotion_grant(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        target: MemberId,
        new_rank: Rank,
        now: Timestamp,
    ) -> Result<OrderId, OrderError> {
        let issuer = caller_member(gateway, caller)?;
        let target_member = gateway.registry().member(target)?;
        self.check_slot_free(target)?;
        if new_rank <= target_member.rank {
            return Err(OrderError::NotAPromotion {
                current: target_member.rank,
                new_rank,
            });
        }
        if !issuer.rank.outranks_by_margin(new_rank) {
            return Err(OrderError::ExceedsIssuerCeiling {
                issuer_rank: issuer.rank,
                new_rank,
            });
        }
        self.check_quota(&issuer)?;

        Ok(self.record(gateway, &issuer, target, OrderAction::PromoteGrant { new_rank }, now))
    }

    /// Order a one-level demotion of `target`.
    pub fn issue_demotion_order(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        target: MemberId,
        now: Timestamp,
    ) -> Result<OrderId, OrderError> {
        let issuer = caller_member(gateway, caller)?;
        let target_member = gateway.registry().member(target)?;
        check_seniority(&issuer, target_member)?;
        self.check_slot_free(target)?;
        self.check_quota(&issuer)?;

        Ok(self.record(gateway, &issuer, target, OrderAction::Demote, now))
    }

    /// Order that `target` be rebound to `new_identity`.
    pub fn issue_authority_order(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        target: MemberId,
        new_identity: Identity,
        now: Timestamp,
    ) -> Result<OrderId, OrderError> {
        let issuer = caller_member(gateway, caller)?;
        let target_member = gateway.registry().member(target)?;
        check_seniority(&issuer, target_member)?;
        if !new_identity.is_valid() {
            return Err(OrderError::InvalidIdentity(new_identity));
        }
        if gateway.registry().is_bound(&new_identity) {
            return Err(OrderError::IdentityAlreadyBound(new_identity));
        }
        self.check_slot_free(target)?;
        self.check_quota(&issuer)?;

        Ok(self.record(
            gateway,
            &issuer,
            target,
            OrderAction::AuthorityChange { new_identity },
            now,
        ))
    }

    // ── Completing ──────────────────────────────────────────────────────

    /// Accept a promotion grant. Only the target's own identity may do this,
    /// and only once the timelock has elapsed.
    pub fn accept_promotion_grant(
        &mut self,
        gateway: &mut AuthorizationGateway,
        caller: &Identity,
        id: OrderId,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        let order = self.order(id)?;
        let OrderAction::PromoteGrant { new_rank } = order.action else {
            return Err(OrderError::WrongOrderKind {
                order: id,
                actual: order.kind(),
                expected: "promote_grant",
            });
        };
        let target = gateway.registry().member(order.target)?;
        if &target.identity != caller {
            return Err(OrderError::NotTarget(id));
        }
        let next = order.status.apply(id, OrderTransition::Execute)?;
        if !order.is_unlocked(now) {
            return Err(OrderError::TooEarly {
                order: id,
                execute_after: order.execute_after,
            });
        }
        // The target's rank may have moved during the timelock.
        if new_rank <= target.rank {
            return Err(OrderError::NotAPromotion {
                current: target.rank,
                new_rank,
            });
        }
        let target = order.target;

        gateway.set_rank(CallerRole::OrderEngine, &self.principal, target, new_rank, now)?;
        self.close(id, next);
        tracing::info!(order = %id, member = %target, rank = %new_rank, "promotion grant accepted");
        self.events.push(OrderEvent::Executed {
            order: id,
            target,
            effect: OrderEffect::RankSet(new_rank),
        });
        Ok(())
    }

    /// Carry out a demotion or authority order. Anyone may call this once
    /// the timelock has elapsed. A floor demotion, or an authority change to
    /// an identity bound in the meantime, closes the order without effect.
    pub fn execute_order(
        &mut self,
        gateway: &mut AuthorizationGateway,
        id: OrderId,
        now: Timestamp,
    ) -> Result<OrderEffect, OrderError> {
        let order = self.order(id)?;
        let new_identity = match &order.action {
            OrderAction::PromoteGrant { .. } => {
                return Err(OrderError::WrongOrderKind {
                    order: id,
                    actual: order.kind(),
                    expected: "demote or authority_change",
                })
            }
            OrderAction::Demote => None,
            OrderAction::AuthorityChange { new_identity } => Some(new_identity.clone()),
        };
        let next = order.status.apply(id, OrderTransition::Execute)?;
        if !order.is_unlocked(now) {
            return Err(OrderError::TooEarly {
                order: id,
                execute_after: order.execute_after,
            });
        }
        let target = order.target;
        let current = gateway.registry().member(target)?.rank;

        let effect = match new_identity {
            None if current == Rank::LOWEST => OrderEffect::AtFloor,
            None => {
                let lower = current.demoted();
                gateway.set_rank(CallerRole::OrderEngine, &self.principal, target, lower, now)?;
                OrderEffect::RankSet(lower)
            }
            Some(identity) if gateway.registry().is_bound(&identity) => {
                tracing::warn!(order = %id, member = %target, %identity, "identity taken during timelock");
                OrderEffect::IdentityTaken(identity)
            }
            Some(identity) => {
                gateway.set_authority(CallerRole::OrderEngine, &self.principal, target, identity.clone())?;
                OrderEffect::AuthorityMoved(identity)
            }
        };

        self.close(id, next);
        tracing::info!(order = %id, member = %target, ?effect, "order executed");
        self.events.push(OrderEvent::Executed {
            order: id,
            target,
            effect: effect.clone(),
        });
        Ok(effect)
    }

    // ── Stopping ────────────────────────────────────────────────────────

    /// Veto an order before its timelock elapses. The blocker must sit at
    /// least two levels above the issuer's rank as frozen at creation.
    pub fn block_order(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        id: OrderId,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        let blocker = caller_member(gateway, caller)?;
        let order = self.order(id)?;
        let next = order.status.apply(id, OrderTransition::Block(Blocker::Member(blocker.id)))?;
        if order.is_unlocked(now) {
            return Err(OrderError::VetoWindowClosed {
                order: id,
                execute_after: order.execute_after,
            });
        }
        if !blocker.rank.outranks_by_margin(order.issuer_rank) {
            return Err(OrderError::VetoSeniority {
                blocker_rank: blocker.rank,
                issuer_rank: order.issuer_rank,
            });
        }

        self.close(id, next);
        tracing::info!(order = %id, blocker = %blocker.id, "order vetoed");
        self.events.push(OrderEvent::Blocked {
            order: id,
            blocker: blocker.id,
        });
        Ok(())
    }

    /// Withdraw one's own pending order.
    pub fn rescind_order(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        id: OrderId,
    ) -> Result<(), OrderError> {
        let issuer = caller_member(gateway, caller)?;
        let order = self.order(id)?;
        if order.issuer != issuer.id {
            return Err(OrderError::NotIssuer(id));
        }
        let next = order.status.apply(id, OrderTransition::Block(Blocker::Issuer(issuer.id)))?;

        self.close(id, next);
        tracing::info!(order = %id, issuer = %issuer.id, "order rescinded");
        self.events.push(OrderEvent::Rescinded {
            order: id,
            issuer: issuer.id,
        });
        Ok(())
    }

    /// Block an order on behalf of a passed governance proposal. Only the
    /// principal bound to the ProposalEngine role may call this.
    pub fn block_order_by_governance(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        id: OrderId,
        proposal: ProposalId,
    ) -> Result<(), OrderError> {
        if !gateway.is_bound(CallerRole::ProposalEngine, caller) {
            tracing::warn!(%caller, order = %id, "governance block from unbound caller");
            return Err(OrderError::NotGovernance(caller.clone()));
        }
        let order = self.order(id)?;
        let next = order.status.apply(id, OrderTransition::Block(Blocker::Governance(proposal)))?;

        self.close(id, next);
        tracing::info!(order = %id, %proposal, "order blocked by governance");
        self.events.push(OrderEvent::GovernanceBlocked { order: id, proposal });
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn check_slot_free(&self, target: MemberId) -> Result<(), OrderError> {
        match self.outstanding.get(&target) {
            Some(order) => Err(OrderError::TargetHasOutstandingOrder {
                target,
                order: *order,
            }),
            None => Ok(()),
        }
    }

    fn check_quota(&self, issuer: &Member) -> Result<(), OrderError> {
        let limit = order_limit_of_rank(issuer.rank);
        if self.active_order_count(issuer.id) >= limit {
            return Err(OrderError::QuotaExceeded {
                issuer: issuer.id,
                limit,
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        gateway: &AuthorizationGateway,
        issuer: &Member,
        target: MemberId,
        action: OrderAction,
        now: Timestamp,
    ) -> OrderId {
        let id = self.next_id;
        let delay = gateway.registry().params().order_delay_secs;
        let order = PendingOrder {
            id,
            action,
            issuer: issuer.id,
            issuer_rank: issuer.rank,
            target,
            created_at: now,
            execute_after: now.plus_secs(delay),
            status: OrderStatus::Pending,
        };
        let kind = order.kind();
        let execute_after = order.execute_after;

        self.orders.insert(id, order);
        self.outstanding.insert(target, id);
        *self.active_counts.entry(issuer.id).or_insert(0) += 1;
        self.next_id = id.next();

        tracing::info!(
            order = %id,
            %kind,
            issuer = %issuer.id,
            member = %target,
            timelock = %format_duration(delay),
            "order issued"
        );
        self.events.push(OrderEvent::Created {
            order: id,
            kind,
            issuer: issuer.id,
            target,
            execute_after,
        });
        id
    }

    /// Move an order to its terminal status and release the target slot and
    /// issuer quota it held.
    fn close(&mut self, id: OrderId, status: OrderStatus) {
        let Some(order) = self.orders.get_mut(&id) else {
            return;
        };
        order.status = status;
        let (target, issuer) = (order.target, order.issuer);
        if self.outstanding.get(&target) == Some(&id) {
            self.outstanding.remove(&target);
        }
        if let Some(count) = self.active_counts.get_mut(&issuer) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.active_counts.remove(&issuer);
            }
        }
    }
}

fn caller_member(gateway: &AuthorizationGateway, caller: &Identity) -> Result<Member, OrderError> {
    gateway
        .registry()
        .member_by_identity(caller)
        .cloned()
        .map_err(|_| OrderError::NotAMember(caller.clone()))
}

fn check_seniority(issuer: &Member, target: &Member) -> Result<(), OrderError> {
    if !issuer.rank.outranks_by_margin(target.rank) {
        return Err(OrderError::InsufficientSeniority {
            issuer_rank: issuer.rank,
            target_rank: target.rank,
        });
    }
    Ok(())
}
