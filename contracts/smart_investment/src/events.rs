//! # Events
//!
//! Domain events published by the contract. Each event uses a short symbol as
//! its first topic; events about a proposal carry the proposal ID as the second
//! topic so indexers can filter by proposal.
//!
//! | Topic       | Second topic | Data                 |
//! |-------------|--------------|----------------------|
//! | `maker`     | address      | [`MakerRegistered`]  |
//! | `auditor`   | address      | `()`                 |
//! | `proposed`  | proposal ID  | [`ProposalSubmitted`]|
//! | `verified`  | proposal ID  | [`ProposalVerified`] |
//! | `voted`     | proposal ID  | [`VoteCast`]         |
//! | `authzd`    | cycle        | [`ClosingAuthorized`]|
//! | `period`    | cycle        | [`Period`]           |
//! | `winner`    | proposal ID  | [`Winner`]           |
//! | `payout`    | proposal ID  | [`Payout`]           |
//! | `withdrawn` | address      | `i128` amount        |
//! | `paused`    | none         | admin address        |
//! | `unpaused`  | none         | admin address        |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

use crate::types::{Payout, Period};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MakerRegistered {
    pub maker: Address,
    pub name: String,
    pub country: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalSubmitted {
    pub proposal_id: u64,
    pub maker: Address,
    pub name: String,
    pub min_required_investment: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalVerified {
    pub proposal_id: u64,
    pub auditor: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCast {
    pub proposal_id: u64,
    pub voter: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClosingAuthorized {
    pub auditor: Address,
    pub count: u32,
    pub threshold: u32,
}

/// Announced once per cycle when Voting closes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Winner {
    pub cycle: u32,
    pub proposal_id: u64,
    pub name: String,
    pub maker: Address,
    pub min_required_investment: i128,
    pub description: String,
    pub total_balance: i128,
}

pub fn emit_maker_registered(env: &Env, maker: Address, name: String, country: String) {
    let topics = (symbol_short!("maker"), maker.clone());
    env.events().publish(
        topics,
        MakerRegistered {
            maker,
            name,
            country,
        },
    );
}

pub fn emit_auditor_registered(env: &Env, auditor: Address) {
    env.events()
        .publish((symbol_short!("auditor"), auditor), ());
}

pub fn emit_proposal_submitted(
    env: &Env,
    proposal_id: u64,
    maker: Address,
    name: String,
    min_required_investment: i128,
) {
    let topics = (symbol_short!("proposed"), proposal_id);
    env.events().publish(
        topics,
        ProposalSubmitted {
            proposal_id,
            maker,
            name,
            min_required_investment,
        },
    );
}

pub fn emit_proposal_verified(env: &Env, proposal_id: u64, auditor: Address) {
    let topics = (symbol_short!("verified"), proposal_id);
    env.events().publish(
        topics,
        ProposalVerified {
            proposal_id,
            auditor,
        },
    );
}

pub fn emit_vote_cast(env: &Env, proposal_id: u64, voter: Address, amount: i128) {
    let topics = (symbol_short!("voted"), proposal_id);
    env.events().publish(
        topics,
        VoteCast {
            proposal_id,
            voter,
            amount,
        },
    );
}

pub fn emit_closing_authorized(env: &Env, cycle: u32, auditor: Address, count: u32, threshold: u32) {
    let topics = (symbol_short!("authzd"), cycle);
    env.events().publish(
        topics,
        ClosingAuthorized {
            auditor,
            count,
            threshold,
        },
    );
}

pub fn emit_period_changed(env: &Env, cycle: u32, period: Period) {
    env.events()
        .publish((symbol_short!("period"), cycle), period);
}

pub fn emit_winner(env: &Env, winner: Winner) {
    let topics = (symbol_short!("winner"), winner.proposal_id);
    env.events().publish(topics, winner);
}

pub fn emit_payout(env: &Env, payout: Payout) {
    let topics = (symbol_short!("payout"), payout.proposal_id);
    env.events().publish(topics, payout);
}

pub fn emit_withdrawn(env: &Env, recipient: Address, amount: i128) {
    env.events()
        .publish((symbol_short!("withdrawn"), recipient), amount);
}

pub fn emit_paused(env: &Env, admin: Address) {
    env.events().publish((symbol_short!("paused"),), admin);
}

pub fn emit_unpaused(env: &Env, admin: Address) {
    env.events().publish((symbol_short!("unpaused"),), admin);
}
