//! Event kinds published by the `smart_investment` contract and the records
//! the indexer stores for them.
//!
//! The leading topic is always a short symbol. What the second topic holds
//! depends on the kind, see [`TopicScope`].

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the Smart Investment contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `maker`: a Maker was registered with a profile.
    MakerRegistered,
    /// `auditor`: an Auditor was registered.
    AuditorRegistered,
    /// `proposed`: a Maker submitted a proposal.
    ProposalSubmitted,
    /// `verified`: an Auditor verified a proposal.
    ProposalVerified,
    /// `voted`: a Voter pledged tokens to a proposal.
    VoteCast,
    /// `authzd`: an Auditor authorized closing the Voting period.
    ClosingAuthorized,
    /// `period`: the period state machine moved.
    PeriodChanged,
    /// `winner`: the cycle closed and a winner was selected.
    WinnerSelected,
    /// `payout`: an award was credited to the maker or a refund was paid to a backer.
    PayoutCredited,
    /// `withdrawn`: a claimable balance was paid out.
    Withdrawn,
    /// `paused`
    ContractPaused,
    /// `unpaused`
    ContractUnpaused,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

/// Meaning of the second topic for a given [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicScope {
    Proposal,
    Account,
    Cycle,
    None,
}

impl EventKind {
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "maker" => Self::MakerRegistered,
            "auditor" => Self::AuditorRegistered,
            "proposed" => Self::ProposalSubmitted,
            "verified" => Self::ProposalVerified,
            "voted" => Self::VoteCast,
            "authzd" => Self::ClosingAuthorized,
            "period" => Self::PeriodChanged,
            "winner" => Self::WinnerSelected,
            "payout" => Self::PayoutCredited,
            "withdrawn" => Self::Withdrawn,
            "paused" => Self::ContractPaused,
            "unpaused" => Self::ContractUnpaused,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MakerRegistered => "maker_registered",
            Self::AuditorRegistered => "auditor_registered",
            Self::ProposalSubmitted => "proposal_submitted",
            Self::ProposalVerified => "proposal_verified",
            Self::VoteCast => "vote_cast",
            Self::ClosingAuthorized => "closing_authorized",
            Self::PeriodChanged => "period_changed",
            Self::WinnerSelected => "winner_selected",
            Self::PayoutCredited => "payout_credited",
            Self::Withdrawn => "withdrawn",
            Self::ContractPaused => "contract_paused",
            Self::ContractUnpaused => "contract_unpaused",
            Self::Unknown => "unknown",
        }
    }

    pub fn scope(&self) -> TopicScope {
        match self {
            Self::ProposalSubmitted
            | Self::ProposalVerified
            | Self::VoteCast
            | Self::WinnerSelected
            | Self::PayoutCredited => TopicScope::Proposal,
            Self::MakerRegistered | Self::AuditorRegistered | Self::Withdrawn => {
                TopicScope::Account
            }
            Self::ClosingAuthorized | Self::PeriodChanged => TopicScope::Cycle,
            Self::ContractPaused | Self::ContractUnpaused | Self::Unknown => TopicScope::None,
        }
    }
}

/// A decoded contract event, ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceEvent {
    /// RPC event ID; unique per event and used for idempotent inserts.
    pub event_id: String,
    pub event_type: String,
    pub proposal_id: Option<String>,
    pub cycle: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    /// Kind-specific extra: the period name, payout kind or proposal name.
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as read back from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub proposal_id: Option<String>,
    pub cycle: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
