//! # Types
//!
//! Shared data structures used across all modules of the Smart Investment
//! contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Proposal` is internally stored as two separate ledger entries:
//!
//! - [`ProposalConfig`]: written once at submission; never mutated.
//! - [`ProposalState`]: written on verification, on every vote and at settlement.
//!
//! The public API exposes the reconstructed [`Proposal`] struct for convenience.
//!
//! ### Period as a Finite-State Machine
//!
//! [`Period`] enforces a strict forward-only cycle:
//!
//! ```text
//! Neutral ──► Submission ──► Voting ──► Neutral
//! ```
//!
//! Every edge is guarded by a dedicated function in [`crate::period`].

use soroban_sdk::{contracttype, Address, String};

/// Role held by an address.
///
/// `None` is the default for any address the admin never registered; such
/// addresses act as voters.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    None,
    Maker,
    Auditor,
}

/// Phase of the governance cycle.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Period {
    /// No cycle in progress. Initial state, and the state a closed cycle returns to.
    Neutral,
    /// Makers submit proposals; auditors verify them.
    Submission,
    /// Voters pledge funds; auditors authorize closing.
    Voting,
}

/// Identity attributes recorded when the admin registers a maker.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MakerProfile {
    pub address: Address,
    pub name: String,
    pub country: String,
    pub passport_id: String,
}

/// Immutable proposal configuration, written once at submission.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalConfig {
    pub id: u64,
    pub cycle: u32,
    pub maker: Address,
    pub name: String,
    pub description: String,
    pub min_required_investment: i128,
}

/// Mutable proposal state, updated on verification, votes and settlement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalState {
    pub verified: bool,
    pub total_votes: u32,
    pub total_balance: i128,
    pub settled: bool,
}

/// Full representation of an investment proposal.
///
/// Used as the public API return type; reconstructed internally from
/// the split `ProposalConfig` + `ProposalState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    /// Unique identifier (auto-incremented across cycles).
    pub id: u64,
    /// Cycle during which the proposal was submitted.
    pub cycle: u32,
    /// Maker that submitted the proposal and receives the award if it wins.
    pub maker: Address,
    pub name: String,
    pub description: String,
    /// Smallest pledge accepted, and the balance the proposal needs to win.
    pub min_required_investment: i128,
    /// Set once by an auditor; only verified proposals accept votes.
    pub verified: bool,
    /// Number of accepted pledges.
    pub total_votes: u32,
    /// Sum of accepted pledges, held in escrow by the contract.
    pub total_balance: i128,
    /// True once the owning cycle has been settled.
    pub settled: bool,
}

/// Reason a payout was credited.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayoutKind {
    /// Escrowed balance of the winning proposal, paid to its maker.
    Award,
    /// Pledge returned to a backer of a losing proposal.
    Refund,
}

/// A balance-transfer instruction produced by settlement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub recipient: Address,
    pub proposal_id: u64,
    pub amount: i128,
    pub kind: PayoutKind,
}

/// Summary of a closed cycle, kept for history queries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CycleOutcome {
    pub cycle: u32,
    pub winner_id: u64,
    pub awarded: i128,
    /// Escrow owed back to backers of losing proposals, claimed individually.
    pub refundable: i128,
}
