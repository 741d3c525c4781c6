extern crate std;

use soroban_sdk::{
    symbol_short, testutils::Events, vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val, Vec,
};

use crate::test::{Fixture, MIN_INVESTMENT};
use crate::{MakerRegistered, Payout, PayoutKind, Period, ProposalSubmitted, VoteCast, Winner};

/// Last event published by `contract` whose first topic is `topic`.
fn find_event(env: &Env, contract: &Address, topic: Symbol) -> Option<(Vec<Val>, Val)> {
    let mut found = None;
    for (address, topics, data) in env.events().all().iter() {
        if address != *contract {
            continue;
        }
        let first: Option<Symbol> = topics.get(0).and_then(|t| t.try_into_val(env).ok());
        if first == Some(topic.clone()) {
            found = Some((topics, data));
        }
    }
    found
}

#[test]
fn test_maker_registered_event() {
    let mut fx = Fixture::new();
    let maker = fx.add_maker();

    let (topics, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("maker")).expect("No maker event");
    let expected_topics: Vec<Val> = vec![
        &fx.env,
        symbol_short!("maker").into_val(&fx.env),
        maker.into_val(&fx.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: MakerRegistered = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        event_data,
        MakerRegistered {
            maker,
            name: fx.text("Maker 1"),
            country: fx.text("UY"),
        }
    );
}

#[test]
fn test_proposal_submitted_event() {
    let fx = Fixture::with_workers(3, 2);
    fx.client.open_submission_period(&fx.admin);
    let id = fx.submit(0, "Proposal 1");

    let (topics, data) = find_event(&fx.env, &fx.client.address, symbol_short!("proposed"))
        .expect("No proposed event");
    let expected_topics: Vec<Val> = vec![
        &fx.env,
        symbol_short!("proposed").into_val(&fx.env),
        id.into_val(&fx.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: ProposalSubmitted = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        event_data,
        ProposalSubmitted {
            proposal_id: id,
            maker: fx.makers[0].clone(),
            name: fx.text("Proposal 1"),
            min_required_investment: MIN_INVESTMENT,
        }
    );
}

#[test]
fn test_vote_cast_event() {
    let fx = Fixture::with_workers(3, 2);
    let (first, _) = fx.open_voting_with_two_proposals();
    let voter = fx.funded_voter(10);
    fx.client.cast_vote(&voter, &first, &10);

    let (_, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("voted")).expect("No voted event");
    let event_data: VoteCast = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        event_data,
        VoteCast {
            proposal_id: first,
            voter,
            amount: 10,
        }
    );
}

#[test]
fn test_period_event_on_voting() {
    let fx = Fixture::with_workers(3, 2);
    fx.open_voting_with_two_proposals();

    let (topics, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("period")).expect("No period event");
    let expected_topics: Vec<Val> = vec![
        &fx.env,
        symbol_short!("period").into_val(&fx.env),
        1u32.into_val(&fx.env),
    ];
    assert_eq!(topics, expected_topics);
    let period: Period = data.try_into_val(&fx.env).unwrap();
    assert_eq!(period, Period::Voting);
}

#[test]
fn test_winner_event() {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();
    let voter1 = fx.funded_voter(10);
    let voter2 = fx.funded_voter(40);
    fx.client.cast_vote(&voter1, &first, &10);
    fx.client.cast_vote(&voter2, &second, &40);
    fx.client.authorize_closing(&fx.auditors[0]);
    fx.client.authorize_closing(&fx.auditors[1]);

    fx.client.open_neutral_period(&fx.admin);

    let (topics, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("winner")).expect("No winner event");
    let expected_topics: Vec<Val> = vec![
        &fx.env,
        symbol_short!("winner").into_val(&fx.env),
        second.into_val(&fx.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: Winner = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        event_data,
        Winner {
            cycle: 1,
            proposal_id: second,
            name: fx.text("Proposal 2"),
            maker: fx.makers[1].clone(),
            min_required_investment: 5,
            description: fx.text("Description"),
            total_balance: 40,
        }
    );
}

#[test]
fn test_award_and_refund_payout_events() {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();
    let voter1 = fx.funded_voter(10);
    let voter2 = fx.funded_voter(40);
    fx.client.cast_vote(&voter1, &first, &10);
    fx.client.cast_vote(&voter2, &second, &40);
    fx.client.authorize_closing(&fx.auditors[0]);
    fx.client.authorize_closing(&fx.auditors[1]);

    fx.client.open_neutral_period(&fx.admin);

    let (_, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("payout")).expect("No award event");
    let award: Payout = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        award,
        Payout {
            recipient: fx.makers[1].clone(),
            proposal_id: second,
            amount: 40,
            kind: PayoutKind::Award,
        }
    );

    fx.client.claim_refund(&voter1, &first);

    let (topics, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("payout")).expect("No payout event");
    let expected_topics: Vec<Val> = vec![
        &fx.env,
        symbol_short!("payout").into_val(&fx.env),
        first.into_val(&fx.env),
    ];
    assert_eq!(topics, expected_topics);

    let payout: Payout = data.try_into_val(&fx.env).unwrap();
    assert_eq!(
        payout,
        Payout {
            recipient: voter1,
            proposal_id: first,
            amount: 10,
            kind: PayoutKind::Refund,
        }
    );
}

#[test]
fn test_paused_event() {
    let fx = Fixture::new();
    fx.client.set_pause(&fx.admin, &true);

    let (_, data) =
        find_event(&fx.env, &fx.client.address, symbol_short!("paused")).expect("No paused event");
    let admin: Address = data.try_into_val(&fx.env).unwrap();
    assert_eq!(admin, fx.admin);
}
