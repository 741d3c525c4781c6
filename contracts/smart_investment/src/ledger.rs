//! # Proposal Ledger
//!
//! Stores investment proposals, their verification status, the pledges that
//! voters make to them, and the settlement credits that recipients withdraw.
//!
//! Pledges are keyed by `(proposal, voter)` and nothing enumerates them, so the
//! cost of a vote or a refund does not depend on how many others backed the
//! same proposal.
//!
//! Proposal IDs grow across cycles. The proposals of the current cycle are the
//! contiguous range `cycle_start..proposal_count`; older proposals stay
//! queryable through [`load`] but no longer accept votes.

use soroban_sdk::{Address, Env, String, Vec};

use crate::storage;
use crate::types::{Proposal, ProposalState};
use crate::Error;

/// Proposals submitted during the current cycle.
pub fn proposal_count(env: &Env) -> u64 {
    storage::get_proposal_count(env) - storage::get_cycle_start(env)
}

pub fn load(env: &Env, id: u64) -> Result<Proposal, Error> {
    storage::load_proposal(env, id)
}

fn in_current_cycle(env: &Env, id: u64) -> bool {
    id >= storage::get_cycle_start(env) && id < storage::get_proposal_count(env)
}

/// All proposals of the current cycle, in submission order.
pub fn current_cycle_proposals(env: &Env) -> Result<Vec<Proposal>, Error> {
    let mut proposals = Vec::new(env);
    for id in storage::get_cycle_start(env)..storage::get_proposal_count(env) {
        proposals.push_back(storage::load_proposal(env, id)?);
    }
    Ok(proposals)
}

/// Append a new, unverified proposal to the current cycle.
pub fn submit(
    env: &Env,
    maker: &Address,
    name: String,
    description: String,
    min_required_investment: i128,
) -> Result<Proposal, Error> {
    if min_required_investment <= 0 {
        return Err(Error::InvalidMinimumInvestment);
    }

    let proposal = Proposal {
        id: storage::get_and_increment_proposal_id(env),
        cycle: storage::get_cycle(env),
        maker: maker.clone(),
        name,
        description,
        min_required_investment,
        verified: false,
        total_votes: 0,
        total_balance: 0,
        settled: false,
    };

    storage::save_proposal(env, &proposal);
    Ok(proposal)
}

/// Mark a proposal as verified.
///
/// Returns `false` when the proposal was already verified or its cycle has
/// been settled; nothing is written in that case.
pub fn verify(env: &Env, id: u64) -> Result<bool, Error> {
    let mut state = storage::load_proposal_state(env, id)?;
    if state.verified || state.settled {
        return Ok(false);
    }
    state.verified = true;
    storage::save_proposal_state(env, id, &state);
    Ok(true)
}

/// Record a pledge of `amount` from `voter`.
///
/// The caller is responsible for moving `amount` into the contract's escrow.
pub fn record_vote(env: &Env, id: u64, voter: &Address, amount: i128) -> Result<Proposal, Error> {
    if !in_current_cycle(env, id) {
        return Err(Error::ProposalNotFound);
    }

    let mut proposal = storage::load_proposal(env, id)?;
    if !proposal.verified {
        return Err(Error::ProposalNotVerified);
    }
    if amount < proposal.min_required_investment {
        return Err(Error::InsufficientAmount);
    }

    let pledged = storage::get_pledge(env, id, voter);
    storage::set_pledge(env, id, voter, pledged + amount);

    proposal.total_votes += 1;
    proposal.total_balance += amount;

    storage::save_proposal_state(
        env,
        id,
        &ProposalState {
            verified: proposal.verified,
            total_votes: proposal.total_votes,
            total_balance: proposal.total_balance,
            settled: proposal.settled,
        },
    );

    Ok(proposal)
}

pub fn pledge_of(env: &Env, id: u64, voter: &Address) -> i128 {
    storage::get_pledge(env, id, voter)
}

/// Retire a proposal once its cycle has been settled.
pub fn mark_settled(env: &Env, id: u64) -> Result<(), Error> {
    let mut state = storage::load_proposal_state(env, id)?;
    state.settled = true;
    storage::save_proposal_state(env, id, &state);
    Ok(())
}

/// Release `voter`'s pledge to a losing proposal of a settled cycle.
///
/// The pledge is zeroed before the amount is returned, so each pledge is
/// refunded once. The caller transfers the returned amount.
pub fn take_refund(env: &Env, id: u64, voter: &Address) -> Result<i128, Error> {
    let proposal = storage::load_proposal(env, id)?;
    match storage::get_outcome(env, proposal.cycle) {
        Some(outcome) if outcome.winner_id != id => {}
        _ => return Err(Error::RefundNotAvailable),
    }

    let pledge = storage::get_pledge(env, id, voter);
    if pledge == 0 {
        return Err(Error::NothingToRefund);
    }
    storage::set_pledge(env, id, voter, 0);
    Ok(pledge)
}

// ── Settlement credits ───────────────────────────────────────────────

pub fn claimable(env: &Env, address: &Address) -> i128 {
    storage::get_claimable(env, address)
}

/// Add `amount` to the withdrawable balance of `recipient`.
pub fn credit(env: &Env, recipient: &Address, amount: i128) {
    let balance = storage::get_claimable(env, recipient);
    storage::set_claimable(env, recipient, balance + amount);
}

/// Take `amount` out of the withdrawable balance of `recipient`.
/// Returns the remaining balance.
pub fn debit(env: &Env, recipient: &Address, amount: i128) -> Result<i128, Error> {
    let balance = storage::get_claimable(env, recipient);
    if amount <= 0 || amount > balance {
        return Err(Error::InsufficientClaimable);
    }
    let remaining = balance - amount;
    storage::set_claimable(env, recipient, remaining);
    Ok(remaining)
}
