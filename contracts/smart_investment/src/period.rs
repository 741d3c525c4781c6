//! # Period State Machine
//!
//! The single process-wide [`Period`] value and the pause flag live here.
//! Each edge of the cycle has exactly one transition function:
//!
//! ```text
//!            open_submission          open_voting           open_neutral
//! Neutral ─────────────────► Submission ───────────► Voting ────────────► Neutral
//! ```
//!
//! Transitions validate every precondition before writing anything, so a
//! rejected transition leaves the ledger untouched. Admin gating and the pause
//! check happen in `lib.rs` before these functions are reached.

use soroban_sdk::Env;

use crate::settlement::{self, Settlement};
use crate::types::Period;
use crate::{ledger, quorum, storage, Error};

/// Makers required before a cycle may open.
pub const MIN_MAKERS: u32 = 3;
/// Auditors required before a cycle may open.
pub const MIN_AUDITORS: u32 = 2;
/// Proposals required in the current cycle before Voting may open.
pub const MIN_PROPOSALS: u64 = 2;

pub fn current(env: &Env) -> Period {
    storage::get_period(env)
}

/// Fail with `ContractPaused` while the admin has paused the workflow.
pub fn require_not_paused(env: &Env) -> Result<(), Error> {
    if storage::is_paused(env) {
        return Err(Error::ContractPaused);
    }
    Ok(())
}

/// Fail with `InvalidPeriodTransition` unless the cycle is in `expected`.
pub fn require_period(env: &Env, expected: Period) -> Result<(), Error> {
    if current(env) != expected {
        return Err(Error::InvalidPeriodTransition);
    }
    Ok(())
}

/// Neutral → Submission. Starts a new cycle and returns its number.
pub fn open_submission(env: &Env) -> Result<u32, Error> {
    require_period(env, Period::Neutral)?;

    if storage::get_maker_count(env) < MIN_MAKERS {
        return Err(Error::InsufficientMakers);
    }
    if storage::get_auditor_count(env) < MIN_AUDITORS {
        return Err(Error::InsufficientAuditors);
    }

    let cycle = storage::start_cycle(env);
    storage::set_period(env, Period::Submission);
    Ok(cycle)
}

/// Submission → Voting. Clears authorizations left over from an earlier cycle.
pub fn open_voting(env: &Env) -> Result<u32, Error> {
    require_period(env, Period::Submission)?;

    if ledger::proposal_count(env) < MIN_PROPOSALS {
        return Err(Error::InsufficientProposals);
    }

    quorum::reset(env);
    storage::set_period(env, Period::Voting);
    Ok(storage::get_cycle(env))
}

/// Voting → Neutral. Requires the closing quorum, selects the winner and
/// returns the settlement for the boundary to execute.
pub fn open_neutral(env: &Env) -> Result<Settlement, Error> {
    require_period(env, Period::Voting)?;

    if !quorum::is_reached(env) {
        return Err(Error::InsufficientClosingAuthorizations);
    }

    let settlement = settlement::plan(env)?;
    settlement::finalize(env, &settlement)?;
    storage::set_period(env, Period::Neutral);
    Ok(settlement)
}
