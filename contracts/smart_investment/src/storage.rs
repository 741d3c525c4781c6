//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the
//! Smart Investment contract:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key                 | Type           | Description                                  |
//! |---------------------|----------------|----------------------------------------------|
//! | `Admin`             | `Address`      | Workflow administrator                       |
//! | `Token`             | `Address`      | Asset used for pledges                       |
//! | `Paused`            | `bool`         | Global pause flag                            |
//! | `Period`            | `Period`       | Current phase of the cycle                   |
//! | `Cycle`             | `u32`          | Number of submission periods opened so far   |
//! | `CycleStart`        | `u64`          | First proposal ID of the current cycle       |
//! | `ProposalCount`     | `u64`          | Auto-increment proposal ID counter           |
//! | `MakerCount`        | `u32`          | Registered makers                            |
//! | `AuditorCount`      | `u32`          | Registered auditors                          |
//! | `ClosingAuth`       | `Vec<Address>` | Auditors that authorized closing Voting      |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type            | Description                         |
//! |-------------------------|-----------------|-------------------------------------|
//! | `Role(addr)`            | `Role`          | Role of a registered address        |
//! | `Profile(addr)`         | `MakerProfile`  | Maker identity attributes           |
//! | `PropConfig(id)`        | `ProposalConfig`| Immutable proposal configuration    |
//! | `PropState(id)`         | `ProposalState` | Mutable proposal state              |
//! | `Pledge(id, addr)`      | `i128`          | Unrefunded pledge of one voter      |
//! | `Claimable(addr)`       | `i128`          | Settlement credit awaiting withdraw |
//! | `Outcome(cycle)`        | `CycleOutcome`  | Result of a closed cycle            |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{
    CycleOutcome, MakerProfile, Period, Proposal, ProposalConfig, ProposalState, Role,
};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    Token,
    Paused,
    Period,
    Cycle,
    CycleStart,
    ProposalCount,
    MakerCount,
    AuditorCount,
    ClosingAuth,
    Role(Address),
    Profile(Address),
    PropConfig(u64),
    PropState(u64),
    Pledge(u64, Address),
    Claimable(Address),
    Outcome(u32),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn get_instance_or<V>(env: &Env, key: &DataKey, default: V) -> V
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    bump_instance(env);
    env.storage().instance().get(key).unwrap_or(default)
}

fn set_instance<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().instance().set(key, value);
    bump_instance(env);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

/// Store the admin and pledge token. Only called from `init`.
pub fn set_config(env: &Env, admin: &Address, token: &Address) {
    set_instance(env, &DataKey::Admin, admin);
    set_instance(env, &DataKey::Token, token);
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn get_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

pub fn is_paused(env: &Env) -> bool {
    get_instance_or(env, &DataKey::Paused, false)
}

pub fn set_paused(env: &Env, paused: bool) {
    set_instance(env, &DataKey::Paused, &paused);
}

pub fn get_period(env: &Env) -> Period {
    get_instance_or(env, &DataKey::Period, Period::Neutral)
}

pub fn set_period(env: &Env, period: Period) {
    set_instance(env, &DataKey::Period, &period);
}

pub fn get_cycle(env: &Env) -> u32 {
    get_instance_or(env, &DataKey::Cycle, 0u32)
}

pub fn get_cycle_start(env: &Env) -> u64 {
    get_instance_or(env, &DataKey::CycleStart, 0u64)
}

/// Begin a new cycle whose proposals start at the next proposal ID.
/// Returns the new cycle number.
pub fn start_cycle(env: &Env) -> u32 {
    let cycle = get_cycle(env) + 1;
    let start = get_proposal_count(env);
    set_instance(env, &DataKey::Cycle, &cycle);
    set_instance(env, &DataKey::CycleStart, &start);
    cycle
}

/// Total proposals ever submitted; also the next proposal ID.
pub fn get_proposal_count(env: &Env) -> u64 {
    get_instance_or(env, &DataKey::ProposalCount, 0u64)
}

/// Atomically reads, increments, and stores the proposal counter.
/// Returns the ID to use for the *current* proposal (pre-increment value).
pub fn get_and_increment_proposal_id(env: &Env) -> u64 {
    let current = get_proposal_count(env);
    set_instance(env, &DataKey::ProposalCount, &(current + 1));
    current
}

pub fn get_maker_count(env: &Env) -> u32 {
    get_instance_or(env, &DataKey::MakerCount, 0u32)
}

pub fn increment_maker_count(env: &Env) -> u32 {
    let count = get_maker_count(env) + 1;
    set_instance(env, &DataKey::MakerCount, &count);
    count
}

pub fn get_auditor_count(env: &Env) -> u32 {
    get_instance_or(env, &DataKey::AuditorCount, 0u32)
}

pub fn increment_auditor_count(env: &Env) -> u32 {
    let count = get_auditor_count(env) + 1;
    set_instance(env, &DataKey::AuditorCount, &count);
    count
}

pub fn get_closing_authorizations(env: &Env) -> Vec<Address> {
    get_instance_or(env, &DataKey::ClosingAuth, Vec::new(env))
}

pub fn set_closing_authorizations(env: &Env, auditors: &Vec<Address>) {
    set_instance(env, &DataKey::ClosingAuth, auditors);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn get_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value: Option<V> = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

/// Role of `address`; unregistered addresses hold `Role::None`.
pub fn get_role(env: &Env, address: &Address) -> Role {
    get_persistent(env, &DataKey::Role(address.clone())).unwrap_or(Role::None)
}

pub fn set_role(env: &Env, address: &Address, role: Role) {
    set_persistent(env, &DataKey::Role(address.clone()), &role);
}

pub fn get_profile(env: &Env, address: &Address) -> Option<MakerProfile> {
    get_persistent(env, &DataKey::Profile(address.clone()))
}

pub fn set_profile(env: &Env, profile: &MakerProfile) {
    set_persistent(env, &DataKey::Profile(profile.address.clone()), profile);
}

/// Save both the immutable config and initial mutable state for a new proposal.
pub fn save_proposal(env: &Env, proposal: &Proposal) {
    let config = ProposalConfig {
        id: proposal.id,
        cycle: proposal.cycle,
        maker: proposal.maker.clone(),
        name: proposal.name.clone(),
        description: proposal.description.clone(),
        min_required_investment: proposal.min_required_investment,
    };

    let state = ProposalState {
        verified: proposal.verified,
        total_votes: proposal.total_votes,
        total_balance: proposal.total_balance,
        settled: proposal.settled,
    };

    set_persistent(env, &DataKey::PropConfig(proposal.id), &config);
    set_persistent(env, &DataKey::PropState(proposal.id), &state);
}

/// Load the full `Proposal` by combining config and state.
pub fn load_proposal(env: &Env, id: u64) -> Result<Proposal, Error> {
    let config = load_proposal_config(env, id)?;
    let state = load_proposal_state(env, id)?;
    Ok(Proposal {
        id: config.id,
        cycle: config.cycle,
        maker: config.maker,
        name: config.name,
        description: config.description,
        min_required_investment: config.min_required_investment,
        verified: state.verified,
        total_votes: state.total_votes,
        total_balance: state.total_balance,
        settled: state.settled,
    })
}

/// Load only the immutable proposal configuration.
pub fn load_proposal_config(env: &Env, id: u64) -> Result<ProposalConfig, Error> {
    get_persistent(env, &DataKey::PropConfig(id)).ok_or(Error::ProposalNotFound)
}

/// Load only the mutable proposal state.
pub fn load_proposal_state(env: &Env, id: u64) -> Result<ProposalState, Error> {
    get_persistent(env, &DataKey::PropState(id)).ok_or(Error::ProposalNotFound)
}

/// Save only the mutable proposal state (votes, verification, settlement).
pub fn save_proposal_state(env: &Env, id: u64, state: &ProposalState) {
    set_persistent(env, &DataKey::PropState(id), state);
}

pub fn get_pledge(env: &Env, proposal_id: u64, voter: &Address) -> i128 {
    get_persistent(env, &DataKey::Pledge(proposal_id, voter.clone())).unwrap_or(0)
}

pub fn set_pledge(env: &Env, proposal_id: u64, voter: &Address, amount: i128) {
    set_persistent(env, &DataKey::Pledge(proposal_id, voter.clone()), &amount);
}

pub fn get_claimable(env: &Env, address: &Address) -> i128 {
    get_persistent(env, &DataKey::Claimable(address.clone())).unwrap_or(0)
}

pub fn set_claimable(env: &Env, address: &Address, amount: i128) {
    set_persistent(env, &DataKey::Claimable(address.clone()), &amount);
}

pub fn get_outcome(env: &Env, cycle: u32) -> Option<CycleOutcome> {
    get_persistent(env, &DataKey::Outcome(cycle))
}

pub fn set_outcome(env: &Env, outcome: &CycleOutcome) {
    set_persistent(env, &DataKey::Outcome(outcome.cycle), outcome);
}
