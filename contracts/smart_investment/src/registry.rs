//! # Identity & Role Registry
//!
//! Tracks which address holds which [`Role`] and the attributes recorded for
//! makers. Every address holds exactly one role; registration is one-way, so
//! an address registered as a maker or auditor can never be registered again.
//!
//! All writes here are admin-gated by the caller in `lib.rs` through
//! [`require_admin`].

use soroban_sdk::{Address, Env, String};

use crate::storage;
use crate::types::{MakerProfile, Role};
use crate::Error;

/// Fail with `NotAuthorized` unless `caller` is the workflow admin.
pub fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin = storage::get_admin(env)?;
    if *caller != admin {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Fail with `NotAuthorized` unless `caller` holds exactly `role`.
pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    if storage::get_role(env, caller) != role {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Fail with `NotAuthorized` if `caller` holds a privileged role.
///
/// Makers and auditors are excluded from voting so that nobody pledges to a
/// proposal they wrote or verified.
pub fn require_voter(env: &Env, caller: &Address) -> Result<(), Error> {
    match storage::get_role(env, caller) {
        Role::None => Ok(()),
        Role::Maker | Role::Auditor => Err(Error::NotAuthorized),
    }
}

pub fn role_of(env: &Env, address: &Address) -> Role {
    storage::get_role(env, address)
}

fn require_unregistered(env: &Env, address: &Address) -> Result<(), Error> {
    match storage::get_role(env, address) {
        Role::None => Ok(()),
        Role::Maker | Role::Auditor => Err(Error::RoleConflict),
    }
}

/// Register `maker` and store its profile. Returns the new maker count.
pub fn register_maker(
    env: &Env,
    maker: &Address,
    name: String,
    country: String,
    passport_id: String,
) -> Result<u32, Error> {
    require_unregistered(env, maker)?;

    storage::set_role(env, maker, Role::Maker);
    storage::set_profile(
        env,
        &MakerProfile {
            address: maker.clone(),
            name,
            country,
            passport_id,
        },
    );
    Ok(storage::increment_maker_count(env))
}

/// Register `auditor`. Returns the new auditor count.
pub fn register_auditor(env: &Env, auditor: &Address) -> Result<u32, Error> {
    require_unregistered(env, auditor)?;

    storage::set_role(env, auditor, Role::Auditor);
    Ok(storage::increment_auditor_count(env))
}

pub fn maker_profile(env: &Env, maker: &Address) -> Result<MakerProfile, Error> {
    storage::get_profile(env, maker).ok_or(Error::MakerNotFound)
}

pub fn maker_count(env: &Env) -> u32 {
    storage::get_maker_count(env)
}

pub fn auditor_count(env: &Env) -> u32 {
    storage::get_auditor_count(env)
}
