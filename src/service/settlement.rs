//! Match settlement: status transitions and the stake sweep.
//!
//! A completion report resolves every pending stake on the match in
//! the same transaction that records the final status. Winning stakes
//! credit their locked payout, losing stakes zero out, and a repeated
//! completion report is a no-op so the sweep can never run twice.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::domain::{
    Account, Amount, Match, MatchId, MatchStatus, Outcome, ParticipantId, Side, Stake,
};
use crate::error::{LedgerError, Result, SettlementError};
use crate::port::LedgerTxn;

/// What to do with a completed match that has no winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawPolicy {
    /// Refuse the completion until an operator names a winner.
    Reject,
    /// Void every pending stake and refund the original amount.
    Push,
}

impl Default for DrawPolicy {
    fn default() -> Self {
        Self::Reject
    }
}

/// An inbound report about a match: a new status, optionally scores
/// and an explicit winner.
#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub score: Option<(u32, u32)>,
    pub winner: Option<ParticipantId>,
}

/// Apply a status report against an open transaction.
///
/// Scores are recorded on any accepted update. Moving into
/// `Completed` additionally settles every pending stake; the winner
/// comes from the report, or failing that from the recorded scores.
pub fn apply(
    txn: &mut dyn LedgerTxn,
    update: &MatchUpdate,
    draw_policy: DrawPolicy,
) -> Result<Match> {
    let mut mat = txn
        .match_by_id(&update.match_id)?
        .ok_or_else(|| SettlementError::MatchNotFound {
            match_id: update.match_id.to_string(),
        })?;

    // A repeated completion report changes nothing: the sweep already
    // ran and the stored result stands.
    if mat.status().is_completed() && update.status.is_completed() {
        return Ok(mat);
    }

    if let Some((a, b)) = update.score {
        mat.record_score(a, b);
    }

    let from = mat.status();
    if !mat.transition(update.status) {
        return Err(SettlementError::InvalidTransition {
            match_id: mat.id().to_string(),
            from,
            to: update.status,
        }
        .into());
    }

    if update.status.is_completed() {
        settle(txn, &mut mat, update.winner.as_ref(), draw_policy, Utc::now())?;
    }

    txn.save_match(&mat)?;
    Ok(mat)
}

/// Resolve the outcome and run the matching sweep.
fn settle(
    txn: &mut dyn LedgerTxn,
    mat: &mut Match,
    explicit: Option<&ParticipantId>,
    policy: DrawPolicy,
    at: DateTime<Utc>,
) -> Result<()> {
    let outcome = match explicit {
        Some(winner) => {
            let side =
                mat.side_of(winner)
                    .ok_or_else(|| SettlementError::WinnerNotInMatch {
                        winner: winner.to_string(),
                        match_id: mat.id().to_string(),
                    })?;
            Outcome::Winner(side)
        }
        None => mat
            .outcome_from_scores()
            .ok_or_else(|| SettlementError::UnknownOutcome {
                match_id: mat.id().to_string(),
            })?,
    };

    match outcome {
        Outcome::Winner(side) => settle_decided(txn, mat, side, at),
        Outcome::Draw => match policy {
            DrawPolicy::Reject => Err(SettlementError::AmbiguousWinner {
                match_id: mat.id().to_string(),
            }
            .into()),
            DrawPolicy::Push => push_all(txn, mat, at),
        },
    }
}

fn settle_decided(
    txn: &mut dyn LedgerTxn,
    mat: &mut Match,
    side: Side,
    at: DateTime<Utc>,
) -> Result<()> {
    mat.set_winner(side);
    let winner = mat.participant(side).clone();

    let mut winners = 0u32;
    let mut losers = 0u32;
    let mut credited = Amount::ZERO;

    for mut stake in txn.pending_stakes(mat.id())? {
        let won = *stake.participant_id() == winner;
        let settled = if won {
            stake.mark_won(at)
        } else {
            stake.mark_lost(at)
        };
        if !settled {
            continue;
        }
        if won {
            let mut account = load_account(txn, &stake)?;
            account.credit_winnings(stake.payout());
            txn.save_account(&account)?;
            credited += stake.payout();
            winners += 1;
        } else {
            losers += 1;
        }
        txn.save_stake(&stake)?;
    }

    info!(
        match_id = %mat.id(),
        winner = %winner,
        winners,
        losers,
        credited = %credited,
        "Match settled"
    );
    Ok(())
}

fn push_all(txn: &mut dyn LedgerTxn, mat: &mut Match, at: DateTime<Utc>) -> Result<()> {
    let mut voided = 0u32;
    let mut refunded = Amount::ZERO;

    for mut stake in txn.pending_stakes(mat.id())? {
        if !stake.mark_void(at) {
            continue;
        }
        let mut account = load_account(txn, &stake)?;
        // A push returns the stake itself, never counted as winnings.
        account.credit(stake.payout());
        txn.save_account(&account)?;
        refunded += stake.payout();
        voided += 1;
        txn.save_stake(&stake)?;
    }

    info!(
        match_id = %mat.id(),
        voided,
        refunded = %refunded,
        "Match pushed, stakes refunded"
    );
    Ok(())
}

/// Accounts referenced by stakes are never deleted; a miss here means
/// the store itself is damaged.
fn load_account(txn: &mut dyn LedgerTxn, stake: &Stake) -> Result<Account> {
    txn.account_by_id(stake.account_id())?.ok_or_else(|| {
        LedgerError::Corrupt(format!(
            "stake {} references missing account {}",
            stake.id(),
            stake.account_id()
        ))
        .into()
    })
}
