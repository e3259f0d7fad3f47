//! The proposal engine: creation, snapshot-weighted voting and finalization.

use crate::error::ProposalError;
use crate::event::ProposalEvent;
use crate::proposal::{Ballot, Proposal, ProposalAction, ProposalOutcome, ProposalState};
use crate::tally::decide;
use guild_gateway::{AuthorizationGateway, CallerRole};
use guild_orders::OrderEngine;
use guild_registry::{proposal_limit_of_rank, Member};
use guild_types::{Identity, MemberId, ProposalId, Rank, Timestamp};
use guild_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Lowest rank allowed to open proposals.
pub const MIN_GOVERNING_RANK: Rank = Rank::F;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalEngine {
    /// Identity this engine presents to the gateway and the order engine.
    principal: Identity,
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: HashSet<(ProposalId, MemberId)>,
    /// Proposer → number of its proposals not yet finalized.
    active_counts: HashMap<MemberId, u32>,
    next_id: ProposalId,
    #[serde(skip)]
    events: Vec<ProposalEvent>,
}

impl ProposalEngine {
    pub fn new(principal: Identity) -> Self {
        Self {
            principal,
            proposals: BTreeMap::new(),
            votes: HashSet::new(),
            active_counts: HashMap::new(),
            next_id: ProposalId::new(1),
            events: Vec::new(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn principal(&self) -> &Identity {
        &self.principal
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, ProposalError> {
        self.proposals.get(&id).ok_or(ProposalError::ProposalNotFound(id))
    }

    pub fn state_of(&self, id: ProposalId, now: Timestamp) -> Result<ProposalState, ProposalError> {
        Ok(self.proposal(id)?.state(now))
    }

    pub fn has_voted(&self, id: ProposalId, voter: MemberId) -> bool {
        self.votes.contains(&(id, voter))
    }

    pub fn active_proposal_count(&self, proposer: MemberId) -> u32 {
        self.active_counts.get(&proposer).copied().unwrap_or(0)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn drain_events(&mut self) -> Vec<ProposalEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Open a proposal. Voting runs from `now` for the current voting period,
    /// weighted by the ledger at the last closed index.
    pub fn create_proposal(
        &mut self,
        gateway: &AuthorizationGateway,
        orders: &OrderEngine,
        caller: &Identity,
        action: ProposalAction,
        now: Timestamp,
    ) -> Result<ProposalId, ProposalError> {
        let proposer = caller_member(gateway, caller)?;
        if proposer.rank < MIN_GOVERNING_RANK {
            return Err(ProposalError::BelowGoverningRank {
                rank: proposer.rank,
                required: MIN_GOVERNING_RANK,
            });
        }
        check_payload(gateway, orders, &action)?;
        let limit = proposal_limit_of_rank(proposer.rank);
        if self.active_proposal_count(proposer.id) >= limit {
            return Err(ProposalError::QuotaExceeded {
                proposer: proposer.id,
                limit,
            });
        }

        let id = self.next_id;
        let period = gateway.registry().params().voting_period_secs;
        let proposal = Proposal {
            id,
            action,
            proposer: proposer.id,
            snapshot: now.closed_ledger_index(),
            start: now,
            end: now.plus_secs(period),
            yes: 0,
            no: 0,
            outcome: None,
        };
        let kind = proposal.action.kind();
        let payload = proposal.action.encode()?;
        let (snapshot, end) = (proposal.snapshot, proposal.end);

        self.proposals.insert(id, proposal);
        *self.active_counts.entry(proposer.id).or_insert(0) += 1;
        self.next_id = id.next();

        tracing::info!(
            proposal = %id,
            %kind,
            proposer = %proposer.id,
            snapshot,
            voting = %format_duration(period),
            "proposal created"
        );
        self.events.push(ProposalEvent::Created {
            proposal: id,
            kind,
            proposer: proposer.id,
            payload,
            snapshot,
            end,
        });
        Ok(id)
    }

    /// Record one member's vote, weighted by its power at the snapshot.
    /// Returns the weight counted.
    pub fn cast_vote(
        &mut self,
        gateway: &AuthorizationGateway,
        caller: &Identity,
        id: ProposalId,
        ballot: Ballot,
        now: Timestamp,
    ) -> Result<u128, ProposalError> {
        let voter = caller_member(gateway, caller)?;
        let proposal = self.proposal(id)?;
        if now < proposal.start {
            return Err(ProposalError::VotingNotOpen {
                proposal: id,
                start: proposal.start,
            });
        }
        if now > proposal.end {
            return Err(ProposalError::VotingClosed {
                proposal: id,
                end: proposal.end,
            });
        }
        if self.has_voted(id, voter.id) {
            return Err(ProposalError::AlreadyVoted {
                proposal: id,
                voter: voter.id,
            });
        }
        let weight = gateway.registry().voting_power_at(voter.id, proposal.snapshot);
        if weight == 0 {
            return Err(ProposalError::NoVotingPower {
                proposal: id,
                voter: voter.id,
            });
        }

        let Some(proposal) = self.proposals.get_mut(&id) else {
            return Err(ProposalError::ProposalNotFound(id));
        };
        match ballot {
            Ballot::Yes => proposal.yes += weight,
            Ballot::No => proposal.no += weight,
        }
        self.votes.insert((id, voter.id));

        tracing::info!(proposal = %id, voter = %voter.id, ?ballot, weight, "vote cast");
        self.events.push(ProposalEvent::Voted {
            proposal: id,
            voter: voter.id,
            ballot,
            weight,
        });
        Ok(weight)
    }

    /// Close a proposal after its voting window and, if it passed, carry out
    /// its effect through the gateway. Permissionless.
    ///
    /// Member-targeting effects are re-checked first. A pending order on the
    /// target fails the call and leaves the proposal `Ended`. A target that no
    /// longer fits the requested change finalizes with the effect skipped.
    pub fn finalize_proposal(
        &mut self,
        gateway: &mut AuthorizationGateway,
        orders: &mut OrderEngine,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ProposalOutcome, ProposalError> {
        let proposal = self.proposal(id)?;
        if proposal.is_finalized() {
            return Err(ProposalError::AlreadyFinalized(id));
        }
        if now <= proposal.end {
            return Err(ProposalError::VotingNotEnded {
                proposal: id,
                end: proposal.end,
            });
        }
        let registry = gateway.registry();
        let total = registry.total_voting_power_at(proposal.snapshot);
        let quorum_bps = registry.params().quorum_bps;
        let outcome = decide(proposal.yes, proposal.no, total, quorum_bps);
        let (action, proposer) = (proposal.action.clone(), proposal.proposer);

        let applied = if outcome.succeeded() {
            self.dispatch(gateway, orders, id, &action, now)?
        } else {
            false
        };

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.outcome = Some(outcome);
        }
        if let Some(count) = self.active_counts.get_mut(&proposer) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.active_counts.remove(&proposer);
            }
        }

        tracing::info!(proposal = %id, ?outcome, total, quorum_bps, applied, "proposal finalized");
        self.events.push(ProposalEvent::Finalized {
            proposal: id,
            outcome,
            applied,
        });
        Ok(outcome)
    }

    /// Align a member's active flag with the fee ledger's verdict.
    /// Permissionless. Returns whether the flag changed.
    pub fn sync_member_activity(
        &self,
        gateway: &mut AuthorizationGateway,
        member: MemberId,
        now: Timestamp,
    ) -> Result<bool, ProposalError> {
        let current = gateway.registry().member(member)?.active;
        let standing = gateway.fee_ledger().in_good_standing(member, now);
        if current == standing {
            tracing::debug!(%member, active = current, "member activity already in sync");
            return Ok(false);
        }
        gateway.set_active(CallerRole::ProposalEngine, &self.principal, member, standing, now)?;
        Ok(true)
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Carry out a passed proposal's effect. Returns whether state changed.
    fn dispatch(
        &self,
        gateway: &mut AuthorizationGateway,
        orders: &mut OrderEngine,
        id: ProposalId,
        action: &ProposalAction,
        now: Timestamp,
    ) -> Result<bool, ProposalError> {
        let role = CallerRole::ProposalEngine;
        let principal = &self.principal;
        match check_member_action(gateway, orders, action) {
            Ok(()) => {}
            Err(err @ ProposalError::TargetHasOutstandingOrder { .. }) => return Err(err),
            Err(err) => {
                tracing::warn!(proposal = %id, error = %err, "effect no longer applies, skipped");
                return Ok(false);
            }
        }

        match action {
            ProposalAction::GrantRank { target, new_rank }
            | ProposalAction::DemoteRank { target, new_rank } => {
                gateway.set_rank(role, principal, *target, *new_rank, now)?;
            }
            ProposalAction::ChangeAuthority {
                target,
                new_identity,
            } => {
                gateway.set_authority(role, principal, *target, new_identity.clone())?;
            }
            ProposalAction::ParameterChange { param, new_value } => {
                gateway.set_param(role, principal, *param, *new_value)?;
            }
            ProposalAction::BlockOrder { order } => {
                let status = orders.order(*order)?.status;
                if status.is_terminal() {
                    tracing::warn!(
                        proposal = %id,
                        order = %order,
                        ?status,
                        "order already closed, governance block skipped"
                    );
                    return Ok(false);
                }
                orders.block_order_by_governance(gateway, principal, *order, id)?;
            }
            ProposalAction::TransferFunds {
                token,
                recipient,
                amount,
            } => {
                gateway.transfer_funds(role, principal, token, recipient, *amount, now)?;
            }
            ProposalAction::ResetFeeExemption { target } => {
                gateway.reset_fee_exemption(role, principal, *target, now)?;
            }
        }
        Ok(true)
    }
}

fn caller_member(gateway: &AuthorizationGateway, caller: &Identity) -> Result<Member, ProposalError> {
    gateway
        .registry()
        .member_by_identity(caller)
        .cloned()
        .map_err(|_| ProposalError::NotAMember(caller.clone()))
}

/// Payload legality at creation time.
fn check_payload(
    gateway: &AuthorizationGateway,
    orders: &OrderEngine,
    action: &ProposalAction,
) -> Result<(), ProposalError> {
    match action {
        ProposalAction::ParameterChange { param, new_value } => {
            if !param.accepts(*new_value) {
                let (min, max) = param.bounds();
                return Err(ProposalError::ParamOutOfBounds {
                    param: *param,
                    value: *new_value,
                    min,
                    max,
                });
            }
            Ok(())
        }
        ProposalAction::BlockOrder { order } => {
            if orders.order(*order)?.status.is_terminal() {
                return Err(ProposalError::OrderNotPending(*order));
            }
            Ok(())
        }
        ProposalAction::TransferFunds {
            recipient, amount, ..
        } => {
            if *amount == 0 {
                return Err(ProposalError::ZeroAmount);
            }
            if !recipient.is_valid() {
                return Err(ProposalError::InvalidIdentity(recipient.clone()));
            }
            Ok(())
        }
        ProposalAction::ResetFeeExemption { target } => {
            gateway.registry().member(*target)?;
            Ok(())
        }
        ProposalAction::GrantRank { .. }
        | ProposalAction::DemoteRank { .. }
        | ProposalAction::ChangeAuthority { .. } => check_member_action(gateway, orders, action),
    }
}

/// Checks for rank and authority effects, run at creation and again right
/// before dispatch. Other actions pass through.
fn check_member_action(
    gateway: &AuthorizationGateway,
    orders: &OrderEngine,
    action: &ProposalAction,
) -> Result<(), ProposalError> {
    let registry = gateway.registry();
    match action {
        ProposalAction::GrantRank { target, new_rank } => {
            let current = registry.member(*target)?.rank;
            if *new_rank <= current {
                return Err(ProposalError::NotAPromotion {
                    current,
                    new_rank: *new_rank,
                });
            }
        }
        ProposalAction::DemoteRank { target, new_rank } => {
            let current = registry.member(*target)?.rank;
            if *new_rank >= current {
                return Err(ProposalError::NotADemotion {
                    current,
                    new_rank: *new_rank,
                });
            }
        }
        ProposalAction::ChangeAuthority {
            target,
            new_identity,
        } => {
            registry.member(*target)?;
            if !new_identity.is_valid() {
                return Err(ProposalError::InvalidIdentity(new_identity.clone()));
            }
            if registry.is_bound(new_identity) {
                return Err(ProposalError::IdentityAlreadyBound(new_identity.clone()));
            }
        }
        _ => return Ok(()),
    }
    if let Some(target) = action.target() {
        if let Some(order) = orders.outstanding_order_for(target) {
            return Err(ProposalError::TargetHasOutstandingOrder { target, order });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::FailureReason;
    use guild_gateway::CapabilityTable;
    use guild_nullables::{NullClock, NullFeeLedger, NullTreasury, TransferRecord};
    use guild_orders::OrderStatus;
    use guild_registry::MembershipRegistry;
    use guild_types::{ErrorKind, GovernableParam, GovernanceParams, TokenId};
    use std::sync::{Arc, Mutex};

    const PERIOD: u64 = 3 * 86_400;
    const DELAY: u64 = 2 * 86_400;

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    fn m(raw: u64) -> MemberId {
        MemberId::new(raw)
    }

    struct Fixture {
        gw: AuthorizationGateway,
        orders: OrderEngine,
        props: ProposalEngine,
        clock: NullClock,
        transfers: Arc<Mutex<Vec<TransferRecord>>>,
        fees: NullFeeLedger,
    }

    /// Genesis ids: sss=1 (SSS, 512), alice=2 (A, 64), bea=3 (B, 32),
    /// carol=4 (C, 16), eve=5 (E, 4), fay=6 (F, 2), gus=7 (G, 1). Total 631.
    ///
    /// The clock is moved past genesis so snapshots see the genesis ledger.
    fn fixture() -> Fixture {
        let clock = NullClock::new(1_000);
        let genesis = [
            (id("sss"), Rank::SSS),
            (id("alice"), Rank::A),
            (id("bea"), Rank::B),
            (id("carol"), Rank::C),
            (id("eve"), Rank::E),
            (id("fay"), Rank::F),
            (id("gus"), Rank::G),
        ];
        let registry =
            MembershipRegistry::new(id("gateway"), GovernanceParams::default(), &genesis, clock.now())
                .unwrap();
        let treasury = NullTreasury::with_limit(1_000);
        let transfers = treasury.transfers();
        let fees = NullFeeLedger::new();
        let gw = AuthorizationGateway::new(
            id("gateway"),
            registry,
            CapabilityTable::new(id("orders"), id("proposals"), id("invites")),
            Box::new(treasury),
            Box::new(fees.clone()),
        )
        .unwrap();
        clock.advance(10);
        Fixture {
            gw,
            orders: OrderEngine::new(id("orders")),
            props: ProposalEngine::new(id("proposals")),
            clock,
            transfers,
            fees,
        }
    }

    impl Fixture {
        fn propose(&mut self, who: &str, action: ProposalAction) -> Result<ProposalId, ProposalError> {
            let now = self.clock.now();
            self.props.create_proposal(&self.gw, &self.orders, &id(who), action, now)
        }

        fn vote(&mut self, who: &str, proposal: ProposalId, ballot: Ballot) -> Result<u128, ProposalError> {
            let now = self.clock.now();
            self.props.cast_vote(&self.gw, &id(who), proposal, ballot, now)
        }

        fn finalize(&mut self, proposal: ProposalId) -> Result<ProposalOutcome, ProposalError> {
            let now = self.clock.now();
            self.props.finalize_proposal(&mut self.gw, &mut self.orders, proposal, now)
        }

        fn close_voting(&self, proposal: ProposalId) {
            let end = self.props.proposal(proposal).unwrap().end;
            self.clock.advance_past(end, 1);
        }

        fn rank_of(&self, member: MemberId) -> Rank {
            self.gw.registry().member(member).unwrap().rank
        }
    }

    fn grant(target: u64, new_rank: Rank) -> ProposalAction {
        ProposalAction::GrantRank {
            target: m(target),
            new_rank,
        }
    }

    #[test]
    fn passed_grant_changes_rank_once() {
        let mut f = fixture();
        let p = f.propose("carol", grant(7, Rank::E)).unwrap();
        assert_eq!(f.props.active_proposal_count(m(4)), 1);
        assert_eq!(f.props.state_of(p, f.clock.now()).unwrap(), ProposalState::Active);

        assert_eq!(f.vote("sss", p, Ballot::Yes).unwrap(), 512);
        f.close_voting(p);
        assert_eq!(f.props.state_of(p, f.clock.now()).unwrap(), ProposalState::Ended);

        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        assert_eq!(f.rank_of(m(7)), Rank::E);
        assert_eq!(f.props.active_proposal_count(m(4)), 0);

        let err = f.finalize(p).unwrap_err();
        assert_eq!(err, ProposalError::AlreadyFinalized(p));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(f.rank_of(m(7)), Rank::E);
    }

    #[test]
    fn creation_requires_governing_rank_and_membership() {
        let mut f = fixture();
        let err = f.propose("gus", grant(6, Rank::E)).unwrap_err();
        assert!(matches!(err, ProposalError::BelowGoverningRank { .. }));
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = f.propose("mallory", grant(7, Rank::F)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn creation_validates_payload() {
        let mut f = fixture();
        let err = f.propose("alice", grant(4, Rank::C)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = f
            .propose(
                "alice",
                ProposalAction::DemoteRank {
                    target: m(7),
                    new_rank: Rank::F,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProposalError::NotADemotion { .. }));

        let err = f
            .propose(
                "alice",
                ProposalAction::ParameterChange {
                    param: GovernableParam::QuorumBps,
                    new_value: 10_001,
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = f
            .propose(
                "alice",
                ProposalAction::ChangeAuthority {
                    target: m(7),
                    new_identity: id("bea"),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        let err = f.propose("alice", grant(99, Rank::F)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = f
            .propose(
                "alice",
                ProposalAction::TransferFunds {
                    token: TokenId::new("gld"),
                    recipient: id("fay"),
                    amount: 0,
                },
            )
            .unwrap_err();
        assert_eq!(err, ProposalError::ZeroAmount);
        assert_eq!(f.props.active_proposal_count(m(2)), 0);
    }

    #[test]
    fn creation_rejects_target_with_pending_order() {
        let mut f = fixture();
        let order = f
            .orders
            .issue_demotion_order(&f.gw, &id("alice"), m(4), f.clock.now())
            .unwrap();
        let err = f.propose("bea", grant(4, Rank::B)).unwrap_err();
        assert_eq!(
            err,
            ProposalError::TargetHasOutstandingOrder {
                target: m(4),
                order
            }
        );
    }

    #[test]
    fn proposal_quota_follows_rank() {
        let mut f = fixture();
        // F may hold one open proposal.
        f.propose("fay", grant(7, Rank::F)).unwrap();
        let err = f.propose("fay", grant(5, Rank::D)).unwrap_err();
        assert_eq!(err, ProposalError::QuotaExceeded { proposer: m(6), limit: 1 });
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    }

    #[test]
    fn quota_frees_on_finalize() {
        let mut f = fixture();
        let p = f.propose("fay", grant(7, Rank::F)).unwrap();
        f.close_voting(p);
        assert_eq!(
            f.finalize(p).unwrap(),
            ProposalOutcome::Failed(FailureReason::QuorumNotMet)
        );
        assert_eq!(f.rank_of(m(7)), Rank::G);
        f.propose("fay", grant(7, Rank::F)).unwrap();
    }

    #[test]
    fn voting_window_and_double_vote() {
        let mut f = fixture();
        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        f.vote("alice", p, Ballot::No).unwrap();
        let err = f.vote("alice", p, Ballot::Yes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(f.props.has_voted(p, m(2)));
        assert_eq!(f.props.proposal(p).unwrap().no, 64);
        assert_eq!(f.props.proposal(p).unwrap().yes, 0);

        let err = f.vote("mallory", p, Ballot::Yes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        // `end` itself is still inside the window.
        let end = f.props.proposal(p).unwrap().end;
        f.clock.advance_past(end, 0);
        f.vote("bea", p, Ballot::Yes).unwrap();
        f.clock.advance(1);
        let err = f.vote("carol", p, Ballot::Yes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timing);

        let err = f.finalize(ProposalId::new(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn finalize_waits_for_end() {
        let mut f = fixture();
        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.clock.advance(PERIOD);
        let err = f.finalize(p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timing);
        assert_eq!(f.props.proposal(p).unwrap().outcome, None);
        f.clock.advance(1);
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
    }

    #[test]
    fn weight_is_pinned_to_snapshot() {
        let mut f = fixture();
        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        let now = f.clock.advance(5);

        // A newcomer admitted after the snapshot has no say.
        let newcomer = f
            .gw
            .add_member(CallerRole::InviteService, &id("invites"), id("newcomer"), now)
            .unwrap();
        let err = f.vote("newcomer", p, Ballot::Yes).unwrap_err();
        assert_eq!(
            err,
            ProposalError::NoVotingPower {
                proposal: p,
                voter: newcomer
            }
        );

        // Promoting a voter afterwards does not reweight its vote.
        f.gw
            .set_rank(CallerRole::ProposalEngine, &id("proposals"), m(6), Rank::SS, now)
            .unwrap();
        assert_eq!(f.vote("fay", p, Ballot::Yes).unwrap(), 2);

        // Deactivating a voter afterwards does not zero its vote either.
        f.gw
            .set_active(CallerRole::ProposalEngine, &id("proposals"), m(5), false, now)
            .unwrap();
        assert_eq!(f.vote("eve", p, Ballot::No).unwrap(), 4);
    }

    #[test]
    fn quorum_uses_snapshot_total() {
        let mut f = fixture();
        // Quorum at 20% of 631 is 126.
        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        f.vote("alice", p, Ballot::Yes).unwrap();
        f.vote("bea", p, Ballot::Yes).unwrap();
        f.vote("carol", p, Ballot::No).unwrap();
        // yes 96 + no 16 = 112 < 126.

        // Deactivating the heaviest member now must not lower the quorum.
        let now = f.clock.now();
        f.gw
            .set_active(CallerRole::ProposalEngine, &id("proposals"), m(1), false, now)
            .unwrap();
        f.close_voting(p);
        assert_eq!(
            f.finalize(p).unwrap(),
            ProposalOutcome::Failed(FailureReason::QuorumNotMet)
        );
        assert_eq!(f.rank_of(m(7)), Rank::G);
    }

    #[test]
    fn tie_fails_with_quorum_met() {
        let mut f = fixture();
        let now = f.clock.now();
        // Two A-rank voters of 64 each, quorum lowered to 10%.
        f.gw
            .set_rank(CallerRole::ProposalEngine, &id("proposals"), m(3), Rank::A, now)
            .unwrap();
        f.gw
            .set_param(CallerRole::ProposalEngine, &id("proposals"), GovernableParam::QuorumBps, 1_000)
            .unwrap();
        f.clock.advance(1);

        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        f.vote("alice", p, Ballot::Yes).unwrap();
        f.vote("bea", p, Ballot::No).unwrap();
        let proposal = f.props.proposal(p).unwrap();
        assert_eq!((proposal.yes, proposal.no), (64, 64));
        f.close_voting(p);
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Failed(FailureReason::Tie));
        assert_eq!(f.rank_of(m(7)), Rank::G);
    }

    #[test]
    fn finalize_revalidates_against_new_order() {
        let mut f = fixture();
        let p = f.propose("alice", grant(7, Rank::F)).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();

        let order = f
            .orders
            .issue_promotion_grant(&f.gw, &id("carol"), m(7), Rank::E, f.clock.now())
            .unwrap();
        f.close_voting(p);
        let err = f.finalize(p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(f.props.state_of(p, f.clock.now()).unwrap(), ProposalState::Ended);
        assert_eq!(f.props.active_proposal_count(m(2)), 1);

        // Once the order clears, the proposal can still be finalized.
        f.orders.rescind_order(&f.gw, &id("carol"), order).unwrap();
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        assert_eq!(f.rank_of(m(7)), Rank::F);
    }

    #[test]
    fn finalize_skips_effect_overtaken_by_order() {
        let mut f = fixture();
        let p = f.propose("fay", grant(7, Rank::F)).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();

        // An order lifts gus past the proposed rank while voting runs.
        let now = f.clock.now();
        let order = f
            .orders
            .issue_promotion_grant(&f.gw, &id("carol"), m(7), Rank::E, now)
            .unwrap();
        let now = f.clock.advance(DELAY);
        f.orders.accept_promotion_grant(&mut f.gw, &id("gus"), order, now).unwrap();

        f.close_voting(p);
        f.props.drain_events();
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        assert_eq!(f.rank_of(m(7)), Rank::E);
        assert!(f.props.proposal(p).unwrap().is_finalized());
        assert_eq!(f.props.active_proposal_count(m(6)), 0);
        assert_eq!(
            f.props.drain_events(),
            vec![ProposalEvent::Finalized {
                proposal: p,
                outcome: ProposalOutcome::Succeeded,
                applied: false,
            }]
        );
        assert_eq!(f.finalize(p).unwrap_err(), ProposalError::AlreadyFinalized(p));

        // fay's quota is free again.
        f.propose("fay", grant(5, Rank::D)).unwrap();
    }

    #[test]
    fn finalize_skips_authority_change_to_bound_identity() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::ChangeAuthority {
                    target: m(7),
                    new_identity: id("gus-new"),
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        let now = f.clock.now();
        let newcomer = f
            .gw
            .add_member(CallerRole::InviteService, &id("invites"), id("gus-new"), now)
            .unwrap();
        f.close_voting(p);
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        let registry = f.gw.registry();
        assert_eq!(registry.member_by_identity(&id("gus-new")).unwrap().id, newcomer);
        assert_eq!(registry.member_by_identity(&id("gus")).unwrap().id, m(7));
        assert_eq!(f.props.active_proposal_count(m(2)), 0);
    }

    #[test]
    fn failed_proposal_has_no_effect() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::DemoteRank {
                    target: m(3),
                    new_rank: Rank::G,
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::No).unwrap();
        f.vote("alice", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        assert_eq!(
            f.finalize(p).unwrap(),
            ProposalOutcome::Failed(FailureReason::Rejected)
        );
        assert_eq!(f.rank_of(m(3)), Rank::B);
        let events = f.props.drain_events();
        assert!(matches!(
            events.last(),
            Some(ProposalEvent::Finalized { applied: false, .. })
        ));
    }

    #[test]
    fn authority_change_rebinds_member() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::ChangeAuthority {
                    target: m(7),
                    new_identity: id("gus-new"),
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        f.finalize(p).unwrap();
        let registry = f.gw.registry();
        assert_eq!(registry.member_by_identity(&id("gus-new")).unwrap().id, m(7));
        assert!(!registry.is_bound(&id("gus")));
    }

    #[test]
    fn parameter_change_reaches_registry() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::ParameterChange {
                    param: GovernableParam::OrderDelay,
                    new_value: 86_400,
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        f.finalize(p).unwrap();
        assert_eq!(f.gw.registry().param(GovernableParam::OrderDelay), 86_400);

        let now = f.clock.now();
        let order = f.orders.issue_demotion_order(&f.gw, &id("alice"), m(4), now).unwrap();
        assert_eq!(f.orders.order(order).unwrap().execute_after, now.plus_secs(86_400));
    }

    #[test]
    fn governance_block_stops_pending_order() {
        let mut f = fixture();
        let order = f
            .orders
            .issue_demotion_order(&f.gw, &id("alice"), m(4), f.clock.now())
            .unwrap();
        let p = f.propose("bea", ProposalAction::BlockOrder { order }).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        assert_eq!(
            f.orders.order(order).unwrap().status,
            OrderStatus::Blocked(guild_orders::Blocker::Governance(p))
        );
        assert_eq!(f.orders.outstanding_order_for(m(4)), None);
        assert_eq!(f.orders.active_order_count(m(2)), 0);
    }

    #[test]
    fn governance_block_tolerates_executed_order() {
        let mut f = fixture();
        let order = f
            .orders
            .issue_demotion_order(&f.gw, &id("alice"), m(4), f.clock.now())
            .unwrap();
        let p = f.propose("bea", ProposalAction::BlockOrder { order }).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();

        // The order's delay is shorter than the voting period.
        let now = f.clock.advance(DELAY);
        f.orders.execute_order(&mut f.gw, order, now).unwrap();
        assert_eq!(f.rank_of(m(4)), Rank::D);

        f.close_voting(p);
        f.props.drain_events();
        assert_eq!(f.finalize(p).unwrap(), ProposalOutcome::Succeeded);
        assert_eq!(f.orders.order(order).unwrap().status, OrderStatus::Executed);
        assert_eq!(
            f.props.drain_events(),
            vec![ProposalEvent::Finalized {
                proposal: p,
                outcome: ProposalOutcome::Succeeded,
                applied: false,
            }]
        );
    }

    #[test]
    fn block_proposal_needs_pending_order() {
        let mut f = fixture();
        let order = f
            .orders
            .issue_demotion_order(&f.gw, &id("alice"), m(4), f.clock.now())
            .unwrap();
        f.orders.rescind_order(&f.gw, &id("alice"), order).unwrap();
        let err = f.propose("bea", ProposalAction::BlockOrder { order }).unwrap_err();
        assert_eq!(err, ProposalError::OrderNotPending(order));

        let err = f
            .propose(
                "bea",
                ProposalAction::BlockOrder {
                    order: guild_types::OrderId::new(77),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn transfer_goes_through_treasury() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::TransferFunds {
                    token: TokenId::new("gld"),
                    recipient: id("fay"),
                    amount: 250,
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        f.finalize(p).unwrap();
        let transfers = f.transfers.lock().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].recipient, id("fay"));
        assert_eq!(transfers[0].amount, 250);
    }

    #[test]
    fn treasury_refusal_leaves_proposal_open() {
        let mut f = fixture();
        let p = f
            .propose(
                "alice",
                ProposalAction::TransferFunds {
                    token: TokenId::new("gld"),
                    recipient: id("fay"),
                    amount: 5_000,
                },
            )
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        let err = f.finalize(p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert!(!f.props.proposal(p).unwrap().is_finalized());
        assert!(f.transfers.lock().unwrap().is_empty());
    }

    #[test]
    fn fee_reset_and_activity_sync() {
        let mut f = fixture();
        let p = f
            .propose("alice", ProposalAction::ResetFeeExemption { target: m(6) })
            .unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        f.finalize(p).unwrap();
        assert_eq!(f.fees.resets(), vec![m(6)]);

        let now = f.clock.now();
        assert!(!f.props.sync_member_activity(&mut f.gw, m(6), now).unwrap());

        f.fees.set_delinquent(m(6), true);
        assert!(f.props.sync_member_activity(&mut f.gw, m(6), now).unwrap());
        assert!(!f.gw.registry().member(m(6)).unwrap().active);
        assert_eq!(f.gw.registry().current_voting_power(m(6)), 0);

        f.fees.set_delinquent(m(6), false);
        let now = f.clock.advance(1);
        assert!(f.props.sync_member_activity(&mut f.gw, m(6), now).unwrap());
        assert_eq!(f.gw.registry().current_voting_power(m(6)), 2);
    }

    #[test]
    fn events_trace_lifecycle() {
        let mut f = fixture();
        let p = f.propose("carol", grant(7, Rank::F)).unwrap();
        f.vote("sss", p, Ballot::Yes).unwrap();
        f.close_voting(p);
        f.finalize(p).unwrap();
        let events = f.props.drain_events();
        assert_eq!(events.len(), 3);
        match &events[0] {
            ProposalEvent::Created { proposer, payload, .. } => {
                assert_eq!(*proposer, m(4));
                assert_eq!(ProposalAction::decode(payload).unwrap(), grant(7, Rank::F));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[1], ProposalEvent::Voted { weight: 512, .. }));
        assert!(matches!(events[2], ProposalEvent::Finalized { applied: true, .. }));
        assert!(f.props.drain_events().is_empty());
    }
}
