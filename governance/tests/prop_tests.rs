use proptest::prelude::*;

use guild_gateway::{AuthorizationGateway, CallerRole, CapabilityTable};
use guild_governance::{
    decide, quorum_threshold, Ballot, FailureReason, ProposalAction, ProposalEngine, ProposalOutcome,
};
use guild_nullables::{NullFeeLedger, NullTreasury};
use guild_orders::OrderEngine;
use guild_registry::MembershipRegistry;
use guild_types::{GovernanceParams, Identity, MemberId, Rank, Timestamp};

const NAMES: [&str; 6] = ["m1", "m2", "m3", "m4", "m5", "m6"];

fn any_rank() -> impl Strategy<Value = Rank> {
    (0u8..10).prop_map(|i| Rank::from_index(i).unwrap())
}

proptest! {
    /// Success needs both quorum and a strict majority.
    #[test]
    fn decide_matches_definition(
        yes in 0u128..10_000,
        no in 0u128..10_000,
        total in 0u128..20_000,
        bps in 1u64..=10_000,
    ) {
        let outcome = decide(yes, no, total, bps);
        let quorum = quorum_threshold(total, bps);
        prop_assert_eq!(outcome.succeeded(), yes + no >= quorum && yes > no);
        if yes + no >= quorum && yes == no {
            prop_assert_eq!(outcome, ProposalOutcome::Failed(FailureReason::Tie));
        }
    }

    /// The threshold never exceeds the total and grows with the bps.
    #[test]
    fn quorum_is_monotone(total in 0u128..1_000_000, a in 1u64..=10_000, b in 1u64..=10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(quorum_threshold(total, lo) <= quorum_threshold(total, hi));
        prop_assert!(quorum_threshold(total, hi) <= total);
    }

    /// Tallies equal the snapshot weights of the voters, whatever happens to
    /// their ranks after the proposal opens.
    #[test]
    fn tally_sums_snapshot_weights(
        ranks in proptest::collection::vec(any_rank(), 6),
        ballots in proptest::collection::vec(proptest::option::of(any::<bool>()), 6),
        later in proptest::collection::vec(any_rank(), 6),
    ) {
        let genesis: Vec<(Identity, Rank)> = NAMES
            .iter()
            .zip(&ranks)
            .map(|(name, rank)| (Identity::new(*name), *rank))
            .chain(std::iter::once((Identity::new("chair"), Rank::SSS)))
            .collect();
        let start = Timestamp::new(500);
        let registry = MembershipRegistry::new(
            Identity::new("gateway"),
            GovernanceParams::default(),
            &genesis,
            start,
        )
        .unwrap();
        let mut gw = AuthorizationGateway::new(
            Identity::new("gateway"),
            registry,
            CapabilityTable::new(Identity::new("orders"), Identity::new("proposals"), Identity::new("invites")),
            Box::new(NullTreasury::new()),
            Box::new(NullFeeLedger::new()),
        )
        .unwrap();
        let orders = OrderEngine::new(Identity::new("orders"));
        let mut props = ProposalEngine::new(Identity::new("proposals"));

        let now = start.plus_secs(1);
        let proposal = props
            .create_proposal(
                &gw,
                &orders,
                &Identity::new("chair"),
                ProposalAction::ResetFeeExemption { target: MemberId::new(1) },
                now,
            )
            .unwrap();

        for (i, rank) in later.iter().enumerate() {
            gw.set_rank(CallerRole::ProposalEngine, &Identity::new("proposals"), MemberId::new(i as u64 + 1), *rank, now)
                .unwrap();
        }

        let (mut yes, mut no) = (0u128, 0u128);
        for (i, ballot) in ballots.iter().enumerate() {
            let Some(support) = ballot else { continue };
            let weight = 1u128 << ranks[i].index();
            let ballot = if *support { Ballot::Yes } else { Ballot::No };
            let counted = props.cast_vote(&gw, &Identity::new(NAMES[i]), proposal, ballot, now).unwrap();
            prop_assert_eq!(counted, weight);
            if *support { yes += weight } else { no += weight }
        }
        let p = props.proposal(proposal).unwrap();
        prop_assert_eq!((p.yes, p.no), (yes, no));
    }
}
