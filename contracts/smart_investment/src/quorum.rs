//! # Closing-Authorization Quorum
//!
//! Auditors vote to close the Voting period. Closing needs a strict majority
//! of the registered auditors, `⌊auditors / 2⌋ + 1`. Once the majority is in,
//! further votes are rejected instead of being recorded.

use soroban_sdk::{Address, Env, Vec};

use crate::{storage, Error};

/// Votes needed to close Voting for the current auditor count.
pub fn threshold(env: &Env) -> u32 {
    storage::get_auditor_count(env) / 2 + 1
}

pub fn count(env: &Env) -> u32 {
    storage::get_closing_authorizations(env).len()
}

pub fn is_reached(env: &Env) -> bool {
    count(env) >= threshold(env)
}

/// Record `auditor`'s vote to close Voting.
///
/// Returns `(count, threshold)` after the vote is recorded.
pub fn authorize(env: &Env, auditor: &Address) -> Result<(u32, u32), Error> {
    let mut auditors = storage::get_closing_authorizations(env);
    let threshold = threshold(env);

    if auditors.contains(auditor) {
        return Err(Error::AlreadyAuthorized);
    }
    if auditors.len() >= threshold {
        return Err(Error::QuorumAlreadyReached);
    }

    auditors.push_back(auditor.clone());
    storage::set_closing_authorizations(env, &auditors);
    Ok((auditors.len(), threshold))
}

/// Forget every recorded vote. Called when a new Voting period opens.
pub fn reset(env: &Env) {
    storage::set_closing_authorizations(env, &Vec::new(env));
}
