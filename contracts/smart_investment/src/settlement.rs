//! # Winner Selection & Settlement
//!
//! When Voting closes, the verified proposal holding the largest escrowed
//! balance wins; ties go to the proposal submitted first. The winning maker is
//! awarded that balance and every backer of every other proposal gets their
//! pledge back.
//!
//! Closing a cycle only touches the cycle's proposals, never its backers. The
//! award is returned as a [`Payout`] that `lib.rs` credits to the maker's
//! withdrawable balance. Refunds are pulled afterwards, one pledge at a time,
//! through [`crate::ledger::take_refund`].

use soroban_sdk::{log, Env, Vec};

use crate::events::Winner;
use crate::types::{CycleOutcome, Payout, PayoutKind, Proposal};
use crate::{ledger, storage, Error};

/// Result of closing a cycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub cycle: u32,
    pub winner: Proposal,
    pub award: Payout,
    /// Escrow left on losing proposals, owed back to their backers.
    pub refundable: i128,
}

impl Settlement {
    pub fn winner_event(&self) -> Winner {
        Winner {
            cycle: self.cycle,
            proposal_id: self.winner.id,
            name: self.winner.name.clone(),
            maker: self.winner.maker.clone(),
            min_required_investment: self.winner.min_required_investment,
            description: self.winner.description.clone(),
            total_balance: self.winner.total_balance,
        }
    }
}

/// Verified proposal with the greatest `total_balance`, lowest ID on ties.
pub fn select_winner(proposals: &Vec<Proposal>) -> Option<Proposal> {
    let mut winner: Option<Proposal> = None;
    for proposal in proposals.iter() {
        if !proposal.verified {
            continue;
        }
        let better = match &winner {
            None => true,
            Some(best) => {
                proposal.total_balance > best.total_balance
                    || (proposal.total_balance == best.total_balance && proposal.id < best.id)
            }
        };
        if better {
            winner = Some(proposal);
        }
    }
    winner
}

/// Compute the settlement of the current cycle without writing anything.
pub fn plan(env: &Env) -> Result<Settlement, Error> {
    let proposals = ledger::current_cycle_proposals(env)?;
    let winner = select_winner(&proposals).ok_or(Error::NoVerifiedProposals)?;

    if winner.total_balance < winner.min_required_investment {
        return Err(Error::InsufficientTotalBalance);
    }

    let refundable: i128 = proposals
        .iter()
        .filter(|p| p.id != winner.id)
        .map(|p| p.total_balance)
        .sum();

    Ok(Settlement {
        cycle: storage::get_cycle(env),
        award: Payout {
            recipient: winner.maker.clone(),
            proposal_id: winner.id,
            amount: winner.total_balance,
            kind: PayoutKind::Award,
        },
        winner,
        refundable,
    })
}

/// Retire the cycle's proposals and record its outcome.
pub fn finalize(env: &Env, settlement: &Settlement) -> Result<(), Error> {
    for id in storage::get_cycle_start(env)..storage::get_proposal_count(env) {
        ledger::mark_settled(env, id)?;
    }

    storage::set_outcome(
        env,
        &CycleOutcome {
            cycle: settlement.cycle,
            winner_id: settlement.winner.id,
            awarded: settlement.award.amount,
            refundable: settlement.refundable,
        },
    );

    log!(
        env,
        "cycle settled: winner {}, awarded {}, refundable {}",
        settlement.winner.id,
        settlement.award.amount,
        settlement.refundable
    );
    Ok(())
}
