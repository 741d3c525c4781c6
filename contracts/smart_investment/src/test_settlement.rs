extern crate std;

use soroban_sdk::{testutils::Address as _, vec, Address, Env, String};

use crate::invariants;
use crate::settlement::select_winner;
use crate::test::{Fixture, MIN_INVESTMENT};
use crate::types::Proposal;
use crate::{CycleOutcome, Error, Period};

/// Fixture in Voting with pledges of 10 (proposal 0) and 40 (proposal 1).
fn voted_fixture() -> (Fixture, u64, u64, Address, Address) {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();
    let voter1 = fx.funded_voter(10);
    let voter2 = fx.funded_voter(40);
    fx.client.cast_vote(&voter1, &first, &10);
    fx.client.cast_vote(&voter2, &second, &40);
    (fx, first, second, voter1, voter2)
}

fn authorize_all(fx: &Fixture) {
    for auditor in fx.auditors.iter() {
        fx.client.authorize_closing(auditor);
    }
}

// ─────────────────────────────────────────────────────────
// Closing preconditions
// ─────────────────────────────────────────────────────────

#[test]
fn test_open_neutral_requires_admin() {
    let (fx, ..) = voted_fixture();
    authorize_all(&fx);

    assert_eq!(
        fx.client.try_open_neutral_period(&fx.makers[0]),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(
        fx.client.try_open_neutral_period(&fx.auditors[0]),
        Err(Ok(Error::NotAuthorized))
    );
    assert_eq!(fx.client.current_period(), Period::Voting);
}

#[test]
fn test_open_neutral_without_enough_authorizations() {
    let (fx, ..) = voted_fixture();
    assert_eq!(
        fx.client.try_open_neutral_period(&fx.admin),
        Err(Ok(Error::InsufficientClosingAuthorizations))
    );

    fx.client.authorize_closing(&fx.auditors[0]);
    assert_eq!(
        fx.client.try_open_neutral_period(&fx.admin),
        Err(Ok(Error::InsufficientClosingAuthorizations))
    );
    assert_eq!(fx.client.current_period(), Period::Voting);
}

#[test]
fn test_open_neutral_without_enough_total_balance() {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();
    authorize_all(&fx);

    assert_eq!(
        fx.client.try_open_neutral_period(&fx.admin),
        Err(Ok(Error::InsufficientTotalBalance))
    );
    assert_eq!(fx.client.current_period(), Period::Voting);
    assert!(!fx.client.get_proposal(&first).settled);
    assert!(!fx.client.get_proposal(&second).settled);
}

#[test]
fn test_open_neutral_without_verified_proposals() {
    let fx = Fixture::with_workers(3, 2);
    fx.client.open_submission_period(&fx.admin);
    fx.submit(0, "Proposal 1");
    fx.submit(1, "Proposal 2");
    fx.client.open_voting_period(&fx.admin);
    authorize_all(&fx);

    assert_eq!(
        fx.client.try_open_neutral_period(&fx.admin),
        Err(Ok(Error::NoVerifiedProposals))
    );
    assert_eq!(fx.client.current_period(), Period::Voting);
}

// ─────────────────────────────────────────────────────────
// Settlement
// ─────────────────────────────────────────────────────────

#[test]
fn test_open_neutral_selects_highest_balance() {
    let (fx, first, second, voter1, voter2) = voted_fixture();
    authorize_all(&fx);

    let winner = fx.client.open_neutral_period(&fx.admin);

    assert_eq!(winner.proposal_id, second);
    assert_eq!(winner.maker, fx.makers[1]);
    assert_eq!(winner.name, fx.text("Proposal 2"));
    assert_eq!(winner.min_required_investment, 5);
    assert_eq!(winner.total_balance, 40);
    assert_eq!(winner.cycle, 1);
    assert_eq!(fx.client.current_period(), Period::Neutral);
    invariants::assert_valid_period_transition(&Period::Voting, &Period::Neutral);

    // Only the award is credited at close; refunds stay as pledges until claimed.
    assert_eq!(fx.client.claimable(&fx.makers[1]), 40);
    assert_eq!(fx.client.claimable(&voter1), 0);
    assert_eq!(fx.client.claimable(&fx.makers[0]), 0);
    assert_eq!(fx.client.pledge_of(&first, &voter1), 10);
    assert_eq!(fx.client.pledge_of(&second, &voter2), 40);

    assert!(fx.client.get_proposal(&first).settled);
    assert!(fx.client.get_proposal(&second).settled);
    assert_eq!(
        fx.client.cycle_outcome(&1),
        Some(CycleOutcome {
            cycle: 1,
            winner_id: second,
            awarded: 40,
            refundable: 10,
        })
    );
    assert_eq!(fx.client.cycle_outcome(&2), None);
}

#[test]
fn test_settled_history_stays_queryable() {
    let (fx, first, second, ..) = voted_fixture();
    let before = fx.client.get_proposal(&second);
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    let after = fx.client.get_proposal(&second);
    invariants::assert_proposal_immutable_fields(&before, &after);
    assert_eq!(after.total_balance, 40);
    assert_eq!(after.total_votes, 1);
    assert_eq!(fx.client.get_proposal(&first).total_balance, 10);
}

#[test]
fn test_tie_goes_to_first_submitted() {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();
    let voter1 = fx.funded_voter(20);
    let voter2 = fx.funded_voter(20);
    fx.client.cast_vote(&voter1, &first, &20);
    fx.client.cast_vote(&voter2, &second, &20);
    authorize_all(&fx);

    let winner = fx.client.open_neutral_period(&fx.admin);
    assert_eq!(winner.proposal_id, first);
    assert_eq!(fx.client.claimable(&fx.makers[0]), 20);
    assert_eq!(fx.client.claim_refund(&voter2, &second), 20);
}

#[test]
fn test_settlement_conserves_escrow() {
    let fx = Fixture::with_workers(3, 2);
    fx.client.open_submission_period(&fx.admin);
    let a = fx.submit(0, "A");
    let b = fx.submit(1, "B");
    let c = fx.submit(2, "C");
    for id in [a, b, c] {
        fx.client.verify_proposal(&fx.auditors[0], &id);
    }
    fx.client.open_voting_period(&fx.admin);

    let v1 = fx.funded_voter(100);
    let v2 = fx.funded_voter(100);
    fx.client.cast_vote(&v1, &a, &30);
    fx.client.cast_vote(&v2, &a, &6);
    fx.client.cast_vote(&v1, &b, &50);
    fx.client.cast_vote(&v2, &c, &8);
    authorize_all(&fx);

    let winner = fx.client.open_neutral_period(&fx.admin);
    assert_eq!(winner.proposal_id, b);
    assert_eq!(fx.client.claimable(&fx.makers[1]), 50);
    assert_eq!(fx.client.cycle_outcome(&1).map(|o| o.refundable), Some(44));

    // Losing pledges plus the award account for the whole escrow.
    let owed = fx.client.claimable(&fx.makers[1])
        + fx.client.pledge_of(&a, &v1)
        + fx.client.pledge_of(&a, &v2)
        + fx.client.pledge_of(&c, &v2);
    assert_eq!(owed, fx.token.balance(&fx.client.address));

    assert_eq!(fx.client.claim_refund(&v1, &a), 30);
    assert_eq!(fx.client.claim_refund(&v2, &a), 6);
    assert_eq!(fx.client.claim_refund(&v2, &c), 8);
    fx.client.withdraw(&fx.makers[1], &50);
    assert_eq!(fx.token.balance(&fx.client.address), 0);
    assert_eq!(fx.token.balance(&v1), 70);
    assert_eq!(fx.token.balance(&v2), 100);
}

#[test]
fn test_close_with_many_backers() {
    let fx = Fixture::with_workers(3, 2);
    let (first, second) = fx.open_voting_with_two_proposals();

    let mut backers = std::vec::Vec::new();
    for _ in 0..400 {
        let voter = fx.funded_voter(MIN_INVESTMENT);
        fx.env.cost_estimate().budget().reset_default();
        fx.client.cast_vote(&voter, &first, &MIN_INVESTMENT);
        backers.push(voter);
    }
    let whale = fx.funded_voter(5_000);
    fx.client.cast_vote(&whale, &second, &5_000);
    authorize_all(&fx);

    // Closing costs the same no matter how many addresses backed the loser.
    fx.env.cost_estimate().budget().reset_default();
    assert_eq!(
        fx.client.try_open_neutral_period(&fx.admin).map(|r| r.map(|w| w.proposal_id)),
        Ok(Ok(second))
    );
    assert_eq!(
        fx.client.cycle_outcome(&1).map(|o| o.refundable),
        Some(400 * MIN_INVESTMENT)
    );

    for voter in [&backers[0], &backers[199], &backers[399]] {
        fx.env.cost_estimate().budget().reset_default();
        assert_eq!(fx.client.claim_refund(voter, &first), MIN_INVESTMENT);
        assert_eq!(fx.token.balance(voter), MIN_INVESTMENT);
    }
    assert_eq!(fx.client.pledge_of(&first, &backers[1]), MIN_INVESTMENT);
}

// ─────────────────────────────────────────────────────────
// Refunds
// ─────────────────────────────────────────────────────────

#[test]
fn test_claim_refund_pays_pledge_once() {
    let (fx, first, _, voter1, _) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    assert_eq!(fx.client.claim_refund(&voter1, &first), 10);
    assert_eq!(fx.token.balance(&voter1), 10);
    assert_eq!(fx.client.pledge_of(&first, &voter1), 0);
    assert_eq!(
        fx.client.try_claim_refund(&voter1, &first),
        Err(Ok(Error::NothingToRefund))
    );
    assert_eq!(fx.token.balance(&fx.client.address), 40);
}

#[test]
fn test_claim_refund_before_close() {
    let (fx, first, _, voter1, _) = voted_fixture();

    assert_eq!(
        fx.client.try_claim_refund(&voter1, &first),
        Err(Ok(Error::RefundNotAvailable))
    );
    assert_eq!(fx.client.pledge_of(&first, &voter1), 10);
}

#[test]
fn test_claim_refund_on_winner_rejected() {
    let (fx, _, second, _, voter2) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    assert_eq!(
        fx.client.try_claim_refund(&voter2, &second),
        Err(Ok(Error::RefundNotAvailable))
    );
    assert_eq!(fx.client.claimable(&fx.makers[1]), 40);
}

#[test]
fn test_claim_refund_without_pledge() {
    let (fx, first, ..) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    let stranger = Address::generate(&fx.env);
    assert_eq!(
        fx.client.try_claim_refund(&stranger, &first),
        Err(Ok(Error::NothingToRefund))
    );
    assert_eq!(
        fx.client.try_claim_refund(&stranger, &99),
        Err(Ok(Error::ProposalNotFound))
    );
}

// ─────────────────────────────────────────────────────────
// Withdrawals
// ─────────────────────────────────────────────────────────

#[test]
fn test_withdraw_transfers_credit() {
    let (fx, ..) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    assert_eq!(fx.client.withdraw(&fx.makers[1], &25), 15);
    assert_eq!(fx.token.balance(&fx.makers[1]), 25);
    assert_eq!(fx.client.withdraw(&fx.makers[1], &15), 0);
    assert_eq!(fx.token.balance(&fx.makers[1]), 40);
    assert_eq!(fx.token.balance(&fx.client.address), 10);
}

#[test]
fn test_withdraw_more_than_credit() {
    let (fx, _, _, voter1, voter2) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    assert_eq!(
        fx.client.try_withdraw(&fx.makers[1], &41),
        Err(Ok(Error::InsufficientClaimable))
    );
    assert_eq!(
        fx.client.try_withdraw(&voter2, &1),
        Err(Ok(Error::InsufficientClaimable))
    );
    assert_eq!(
        fx.client.try_withdraw(&fx.makers[1], &0),
        Err(Ok(Error::InsufficientClaimable))
    );
    // Refunds are claimed per pledge, not withdrawn from a credit.
    assert_eq!(
        fx.client.try_withdraw(&voter1, &10),
        Err(Ok(Error::InsufficientClaimable))
    );
    assert_eq!(fx.client.claimable(&fx.makers[1]), 40);
    assert_eq!(fx.token.balance(&fx.client.address), 50);
}

// ─────────────────────────────────────────────────────────
// Repeated cycles
// ─────────────────────────────────────────────────────────

#[test]
fn test_second_cycle_starts_clean() {
    let (fx, first, _, voter1, _) = voted_fixture();
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    assert_eq!(fx.client.open_submission_period(&fx.admin), 2);
    assert_eq!(fx.client.proposal_count(), 0);

    let third = fx.submit(2, "Proposal 3");
    let fourth = fx.submit(0, "Proposal 4");
    assert_eq!(third, 2);
    assert_eq!(fx.client.get_proposal(&fourth).cycle, 2);
    fx.client.verify_proposal(&fx.auditors[0], &third);
    fx.client.verify_proposal(&fx.auditors[0], &fourth);
    fx.client.open_voting_period(&fx.admin);

    // Authorizations from the previous cycle do not carry over.
    assert_eq!(fx.client.authorization_count(), 0);

    // Proposals from a closed cycle no longer accept votes.
    let voter = fx.funded_voter(10);
    assert_eq!(
        fx.client.try_cast_vote(&voter, &first, &10),
        Err(Ok(Error::ProposalNotFound))
    );

    // Refunds from the closed cycle stay claimable while the next one runs.
    assert_eq!(fx.client.claim_refund(&voter1, &first), 10);

    fx.client.cast_vote(&voter, &fourth, &10);
    authorize_all(&fx);
    let winner = fx.client.open_neutral_period(&fx.admin);
    assert_eq!(winner.proposal_id, fourth);
    assert_eq!(winner.cycle, 2);
    assert_eq!(fx.client.cycle_outcome(&2).map(|o| o.winner_id), Some(fourth));
}

#[test]
fn test_settled_proposal_cannot_be_verified() {
    let fx = Fixture::with_workers(3, 2);
    fx.client.open_submission_period(&fx.admin);
    let first = fx.submit(0, "Proposal 1");
    let second = fx.submit(1, "Proposal 2");
    let late = fx.submit(2, "Proposal 3");
    fx.client.verify_proposal(&fx.auditors[0], &first);
    fx.client.verify_proposal(&fx.auditors[0], &second);
    fx.client.open_voting_period(&fx.admin);
    let voter = fx.funded_voter(10);
    fx.client.cast_vote(&voter, &first, &10);
    authorize_all(&fx);
    fx.client.open_neutral_period(&fx.admin);

    let before = fx.client.get_proposal(&late);
    assert!(before.settled);
    fx.client.verify_proposal(&fx.auditors[1], &late);
    assert_eq!(fx.client.get_proposal(&late), before);
    assert!(!fx.client.get_proposal(&late).verified);
}

// ─────────────────────────────────────────────────────────
// Winner selection
// ─────────────────────────────────────────────────────────

fn proposal(env: &Env, id: u64, verified: bool, total_balance: i128) -> Proposal {
    Proposal {
        id,
        cycle: 1,
        maker: Address::generate(env),
        name: String::from_str(env, "P"),
        description: String::from_str(env, "D"),
        min_required_investment: 1,
        verified,
        total_votes: if total_balance > 0 { 1 } else { 0 },
        total_balance,
        settled: false,
    }
}

#[test]
fn test_select_winner_ignores_unverified() {
    let env = Env::default();
    let proposals = vec![
        &env,
        proposal(&env, 0, true, 10),
        proposal(&env, 1, false, 99),
        proposal(&env, 2, true, 12),
    ];
    assert_eq!(select_winner(&proposals).map(|p| p.id), Some(2));
}

#[test]
fn test_select_winner_none_when_nothing_verified() {
    let env = Env::default();
    let proposals = vec![&env, proposal(&env, 0, false, 0), proposal(&env, 1, false, 0)];
    assert_eq!(select_winner(&proposals), None);
}
