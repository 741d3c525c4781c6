//! # Smart Investment Contract
//!
//! Governance workflow for investment proposals. Three roles act over a
//! repeating cycle of periods:
//!
//! - **Makers** submit proposals during Submission.
//! - **Auditors** verify proposals and, during Voting, authorize closing it.
//! - **Voters** (any address without a role) pledge funds to verified proposals.
//!
//! | Phase        | Entry Point(s)                                              |
//! |--------------|-------------------------------------------------------------|
//! | Bootstrap    | [`SmartInvestment::init`]                                   |
//! | Registry     | `register_maker`, `register_auditor`                        |
//! | Periods      | `open_submission_period`, `open_voting_period`, `open_neutral_period` |
//! | Submission   | `submit_proposal`, `verify_proposal`                        |
//! | Voting       | `cast_vote`, `authorize_closing`                            |
//! | Payouts      | `withdraw`, `claim_refund`                                  |
//! | Emergency    | `set_pause`                                                 |
//! | Queries      | `role_of`, `get_proposal`, `current_period`, ...            |
//!
//! ## Architecture
//!
//! This file is the boundary: it authenticates callers, applies the pause and
//! role gates, moves tokens and publishes events. Workflow rules live in
//! [`registry`], [`ledger`], [`period`], [`quorum`] and [`settlement`];
//! storage access is delegated to `storage`.
//!
//! Every entry point returns `Result<_, Error>`. A failed call leaves the
//! ledger exactly as it was.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, String};

mod events;
mod storage;
mod types;

pub mod ledger;
pub mod period;
pub mod quorum;
pub mod registry;
pub mod settlement;

#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_settlement;

pub use events::{
    ClosingAuthorized, MakerRegistered, ProposalSubmitted, ProposalVerified, VoteCast, Winner,
};
pub use types::{CycleOutcome, MakerProfile, Payout, PayoutKind, Period, Proposal, Role};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotAuthorized                     = 1,
    InvalidPeriodTransition           = 2,
    InsufficientMakers                = 3,
    InsufficientAuditors              = 4,
    InsufficientProposals             = 5,
    InsufficientClosingAuthorizations = 6,
    InsufficientTotalBalance          = 7,
    ProposalNotVerified               = 8,
    InsufficientAmount                = 9,
    AlreadyAuthorized                 = 10,
    QuorumAlreadyReached              = 11,
    ContractPaused                    = 12,
    RoleConflict                      = 13,
    AlreadyInitialized                = 14,
    NotInitialized                    = 15,
    ProposalNotFound                  = 16,
    MakerNotFound                     = 17,
    NoVerifiedProposals               = 18,
    InvalidMinimumInvestment          = 19,
    InsufficientClaimable             = 20,
    RefundNotAvailable                = 21,
    NothingToRefund                   = 22,
}

#[contract]
pub struct SmartInvestment;

#[contractimpl]
impl SmartInvestment {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Set the workflow admin and the token used for pledges.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls fail with `Error::AlreadyInitialized`.
    pub fn init(env: Env, admin: Address, token: Address) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        storage::set_config(&env, &admin, &token);
        Ok(())
    }

    /// Pause or resume every state-changing entry point except this one.
    pub fn set_pause(env: Env, caller: Address, paused: bool) -> Result<(), Error> {
        caller.require_auth();
        registry::require_admin(&env, &caller)?;

        storage::set_paused(&env, paused);
        if paused {
            events::emit_paused(&env, caller);
        } else {
            events::emit_unpaused(&env, caller);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Identity & role registry
    // ─────────────────────────────────────────────────────────

    /// Register `maker` with its identity attributes.
    ///
    /// - `caller` must be the admin.
    /// - Fails with `RoleConflict` if `maker` already holds a role.
    pub fn register_maker(
        env: Env,
        caller: Address,
        maker: Address,
        name: String,
        country: String,
        passport_id: String,
    ) -> Result<(), Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;
        registry::require_admin(&env, &caller)?;

        registry::register_maker(&env, &maker, name.clone(), country.clone(), passport_id)?;
        events::emit_maker_registered(&env, maker, name, country);
        Ok(())
    }

    /// Register `auditor`. `caller` must be the admin.
    pub fn register_auditor(env: Env, caller: Address, auditor: Address) -> Result<(), Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;
        registry::require_admin(&env, &caller)?;

        registry::register_auditor(&env, &auditor)?;
        events::emit_auditor_registered(&env, auditor);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Period transitions (admin only)
    // ─────────────────────────────────────────────────────────

    /// Neutral → Submission. Returns the number of the cycle just opened.
    pub fn open_submission_period(env: Env, caller: Address) -> Result<u32, Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;
        registry::require_admin(&env, &caller)?;

        let cycle = period::open_submission(&env)?;
        events::emit_period_changed(&env, cycle, Period::Submission);
        Ok(cycle)
    }

    /// Submission → Voting.
    pub fn open_voting_period(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;
        registry::require_admin(&env, &caller)?;

        let cycle = period::open_voting(&env)?;
        events::emit_period_changed(&env, cycle, Period::Voting);
        Ok(())
    }

    /// Voting → Neutral. Settles the cycle and returns the winner.
    ///
    /// The winning maker is credited the proposal's escrowed balance, to be
    /// collected through [`SmartInvestment::withdraw`]. Backers of the other
    /// proposals collect their pledges through [`SmartInvestment::claim_refund`].
    pub fn open_neutral_period(env: Env, caller: Address) -> Result<Winner, Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;
        registry::require_admin(&env, &caller)?;

        let settlement = period::open_neutral(&env)?;
        ledger::credit(&env, &settlement.award.recipient, settlement.award.amount);
        events::emit_payout(&env, settlement.award.clone());

        let winner = settlement.winner_event();
        events::emit_winner(&env, winner.clone());
        events::emit_period_changed(&env, settlement.cycle, Period::Neutral);
        Ok(winner)
    }

    // ─────────────────────────────────────────────────────────
    // Proposals
    // ─────────────────────────────────────────────────────────

    /// Submit a proposal during Submission. Returns the new proposal ID.
    ///
    /// - `maker` must hold the `Maker` role.
    /// - `min_required_investment` must be positive.
    pub fn submit_proposal(
        env: Env,
        maker: Address,
        name: String,
        description: String,
        min_required_investment: i128,
    ) -> Result<u64, Error> {
        maker.require_auth();
        period::require_not_paused(&env)?;
        registry::require_role(&env, &maker, Role::Maker)?;
        period::require_period(&env, Period::Submission)?;

        let proposal = ledger::submit(&env, &maker, name, description, min_required_investment)?;
        events::emit_proposal_submitted(
            &env,
            proposal.id,
            maker,
            proposal.name,
            proposal.min_required_investment,
        );
        Ok(proposal.id)
    }

    /// Mark a proposal as verified. `auditor` must hold the `Auditor` role.
    ///
    /// Verifying an already verified proposal succeeds without side effects.
    pub fn verify_proposal(env: Env, auditor: Address, proposal_id: u64) -> Result<(), Error> {
        auditor.require_auth();
        period::require_not_paused(&env)?;
        registry::require_role(&env, &auditor, Role::Auditor)?;

        if ledger::verify(&env, proposal_id)? {
            events::emit_proposal_verified(&env, proposal_id, auditor);
        }
        Ok(())
    }

    /// Pledge `amount` of the configured token to a verified proposal.
    ///
    /// - `voter` must hold no role.
    /// - `amount` must be at least the proposal's `min_required_investment`.
    /// - The tokens are held by the contract until the cycle is settled.
    pub fn cast_vote(env: Env, voter: Address, proposal_id: u64, amount: i128) -> Result<(), Error> {
        voter.require_auth();
        period::require_not_paused(&env)?;
        registry::require_voter(&env, &voter)?;
        period::require_period(&env, Period::Voting)?;

        let token = storage::get_token(&env)?;
        ledger::record_vote(&env, proposal_id, &voter, amount)?;

        let token_client = token::Client::new(&env, &token);
        token_client.transfer(&voter, &env.current_contract_address(), &amount);

        events::emit_vote_cast(&env, proposal_id, voter, amount);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Closing quorum
    // ─────────────────────────────────────────────────────────

    /// Record `auditor`'s vote to close Voting. Returns the vote count.
    pub fn authorize_closing(env: Env, auditor: Address) -> Result<u32, Error> {
        auditor.require_auth();
        period::require_not_paused(&env)?;
        registry::require_role(&env, &auditor, Role::Auditor)?;
        period::require_period(&env, Period::Voting)?;

        let (count, threshold) = quorum::authorize(&env, &auditor)?;
        events::emit_closing_authorized(&env, storage::get_cycle(&env), auditor, count, threshold);
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────
    // Payouts
    // ─────────────────────────────────────────────────────────

    /// Transfer `amount` of `caller`'s settlement credit to `caller`.
    /// Returns the credit left after the transfer.
    pub fn withdraw(env: Env, caller: Address, amount: i128) -> Result<i128, Error> {
        caller.require_auth();
        period::require_not_paused(&env)?;

        let token = storage::get_token(&env)?;
        let remaining = ledger::debit(&env, &caller, amount)?;

        let token_client = token::Client::new(&env, &token);
        token_client.transfer(&env.current_contract_address(), &caller, &amount);

        events::emit_withdrawn(&env, caller, amount);
        Ok(remaining)
    }

    /// Return `voter`'s pledge to a proposal that lost a settled cycle.
    /// Returns the amount transferred.
    ///
    /// - Fails with `RefundNotAvailable` while the proposal's cycle is open
    ///   and for the winning proposal.
    /// - Fails with `NothingToRefund` if nothing is pledged or it was refunded.
    pub fn claim_refund(env: Env, voter: Address, proposal_id: u64) -> Result<i128, Error> {
        voter.require_auth();
        period::require_not_paused(&env)?;

        let token = storage::get_token(&env)?;
        let amount = ledger::take_refund(&env, proposal_id, &voter)?;

        let token_client = token::Client::new(&env, &token);
        token_client.transfer(&env.current_contract_address(), &voter, &amount);

        events::emit_payout(
            &env,
            Payout {
                recipient: voter,
                proposal_id,
                amount,
                kind: PayoutKind::Refund,
            },
        );
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }

    /// Token used for pledges and payouts.
    pub fn pledge_token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    /// Role held by `address`; `Role::None` for unregistered addresses.
    pub fn role_of(env: Env, address: Address) -> Role {
        registry::role_of(&env, &address)
    }

    pub fn maker_profile(env: Env, maker: Address) -> Result<MakerProfile, Error> {
        registry::maker_profile(&env, &maker)
    }

    pub fn maker_count(env: Env) -> u32 {
        registry::maker_count(&env)
    }

    pub fn auditor_count(env: Env) -> u32 {
        registry::auditor_count(&env)
    }

    pub fn current_period(env: Env) -> Period {
        period::current(&env)
    }

    /// Number of submission periods opened so far.
    pub fn current_cycle(env: Env) -> u32 {
        storage::get_cycle(&env)
    }

    /// Proposals submitted during the current cycle.
    pub fn proposal_count(env: Env) -> u64 {
        ledger::proposal_count(&env)
    }

    pub fn get_proposal(env: Env, proposal_id: u64) -> Result<Proposal, Error> {
        ledger::load(&env, proposal_id)
    }

    /// Pledge of `voter` to a proposal not yet refunded.
    pub fn pledge_of(env: Env, proposal_id: u64, voter: Address) -> i128 {
        ledger::pledge_of(&env, proposal_id, &voter)
    }

    pub fn authorization_count(env: Env) -> u32 {
        quorum::count(&env)
    }

    /// Authorizations needed to close the current Voting period.
    pub fn closing_threshold(env: Env) -> u32 {
        quorum::threshold(&env)
    }

    /// Settlement credit `address` can withdraw.
    pub fn claimable(env: Env, address: Address) -> i128 {
        ledger::claimable(&env, &address)
    }

    /// Outcome of a closed cycle, or `None` if the cycle has not closed.
    pub fn cycle_outcome(env: Env, cycle: u32) -> Option<CycleOutcome> {
        storage::get_outcome(&env, cycle)
    }
}
