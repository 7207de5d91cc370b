//! The stake placement unit of work.
//!
//! Runs inside one match-scoped ledger transaction. Every step below
//! either completes or takes the whole transaction down with it:
//! validation, the pre-stake quote refresh, the debit, the stake record
//! and the post-stake quote refresh land together or not at all.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{
    quote, AccountId, Amount, Match, MatchId, OddsPair, OddsQuote, ParticipantId, PricingConfig,
    Side, Stake,
};
use crate::error::{PlacementError, Result};
use crate::port::LedgerTxn;

/// A request to place a stake.
///
/// There is no odds field: the engine quotes odds itself inside the
/// placement transaction and never trusts a client-sent price.
#[derive(Debug, Clone)]
pub struct StakeRequest {
    pub account_id: AccountId,
    pub match_id: MatchId,
    pub participant_id: ParticipantId,
    pub amount: Amount,
}

/// Place a stake against an open transaction.
///
/// The caller supplies the transaction scope; any error unwinds it.
/// The returned stake carries exactly the odds and payout that were
/// persisted.
pub fn place(
    txn: &mut dyn LedgerTxn,
    request: &StakeRequest,
    pricing: &PricingConfig,
) -> Result<Stake> {
    let mat = txn
        .match_by_id(&request.match_id)?
        .ok_or_else(|| PlacementError::MatchNotFound {
            match_id: request.match_id.to_string(),
        })?;

    if !mat.accepts_stakes() {
        return Err(PlacementError::BettingClosed {
            match_id: mat.id().to_string(),
            status: mat.status(),
        }
        .into());
    }

    let side = mat
        .side_of(&request.participant_id)
        .ok_or_else(|| PlacementError::ParticipantNotInMatch {
            participant_id: request.participant_id.to_string(),
            match_id: mat.id().to_string(),
        })?;

    let mut account =
        txn.account_by_id(&request.account_id)?
            .ok_or_else(|| PlacementError::AccountNotFound {
                account_id: request.account_id.to_string(),
            })?;

    // The balance must cover the stake before anything is persisted.
    // `debit` refuses and leaves the account untouched otherwise.
    if !account.debit(request.amount) {
        return Err(PlacementError::InsufficientBalance {
            available: account.balance(),
            required: request.amount,
        }
        .into());
    }

    let now = Utc::now();

    // Quotes as of the pool the bettor saw, before this stake joins it.
    let pre = current_quotes(txn, &mat, pricing)?;
    publish(txn, &mat, pre, now)?;

    let stake = Stake::accept(
        request.account_id.clone(),
        request.match_id.clone(),
        request.participant_id.clone(),
        request.amount,
        pre.for_side(side),
        now,
    );
    txn.insert_stake(&stake)?;
    txn.save_account(&account)?;

    // The pool has moved; republish so the next bettor sees it.
    let post = current_quotes(txn, &mat, pricing)?;
    publish(txn, &mat, post, now)?;

    Ok(stake)
}

/// Run the calculator over the pooled volumes as stored right now.
fn current_quotes(
    txn: &mut dyn LedgerTxn,
    mat: &Match,
    pricing: &PricingConfig,
) -> Result<OddsPair> {
    let mut volume_a = Amount::ZERO;
    let mut volume_b = Amount::ZERO;
    // Placement guarantees every stake backs one of the two sides.
    for (participant, amount) in txn.stake_volumes(mat.id())? {
        match mat.side_of(&participant) {
            Some(Side::A) => volume_a += amount,
            Some(Side::B) => volume_b += amount,
            None => {}
        }
    }
    Ok(quote(volume_a, volume_b, pricing))
}

fn publish(
    txn: &mut dyn LedgerTxn,
    mat: &Match,
    pair: OddsPair,
    at: DateTime<Utc>,
) -> Result<()> {
    txn.upsert_quote(&OddsQuote::new(
        mat.id().clone(),
        mat.side_a().clone(),
        pair.side_a,
        at,
    ))?;
    txn.upsert_quote(&OddsQuote::new(
        mat.id().clone(),
        mat.side_b().clone(),
        pair.side_b,
        at,
    ))?;
    debug!(
        match_id = %mat.id(),
        odds_a = %pair.side_a,
        odds_b = %pair.side_b,
        "Quotes republished"
    );
    Ok(())
}
