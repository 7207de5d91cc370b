//! The betting service facade.
//!
//! Owns the ledger handle and the pricing and settlement knobs, and
//! runs each operation as one match-scoped transaction. This is the
//! only layer that talks to [`Ledger`]; everything below works against
//! an open transaction.

use tracing::{info, warn};

use crate::domain::{Amount, Match, PricingConfig, Stake};
use crate::error::{PlacementError, Result};
use crate::port::Ledger;

use super::placement::{self, StakeRequest};
use super::settlement::{self, DrawPolicy, MatchUpdate};

#[derive(Clone)]
pub struct BettingService<L> {
    ledger: L,
    pricing: PricingConfig,
    draw_policy: DrawPolicy,
}

impl<L: Ledger> BettingService<L> {
    pub fn new(ledger: L, pricing: PricingConfig, draw_policy: DrawPolicy) -> Self {
        Self {
            ledger,
            pricing,
            draw_policy,
        }
    }

    /// Place a stake: quote, debit, record and republish, atomically.
    pub async fn place_stake(&self, request: StakeRequest) -> Result<Stake> {
        // Worth rejecting before taking the match lock.
        if request.amount <= Amount::ZERO {
            warn!(
                account_id = %request.account_id,
                match_id = %request.match_id,
                amount = %request.amount,
                "Rejecting non-positive stake amount"
            );
            return Err(PlacementError::InvalidAmount {
                amount: request.amount,
            }
            .into());
        }

        let match_id = request.match_id.clone();
        let pricing = self.pricing.clone();
        let result = self
            .ledger
            .with_match(&match_id, move |txn| {
                placement::place(txn, &request, &pricing)
            })
            .await;

        match &result {
            Ok(stake) => info!(
                stake_id = %stake.id(),
                match_id = %stake.match_id(),
                participant_id = %stake.participant_id(),
                amount = %stake.amount(),
                odds = %stake.odds(),
                payout = %stake.payout(),
                "Stake accepted"
            ),
            Err(err) if !err.is_retryable() => warn!(
                match_id = %match_id,
                error = %err,
                "Stake rejected"
            ),
            Err(_) => {}
        }
        result
    }

    /// Apply a match status report, settling stakes on completion.
    pub async fn update_match_status(&self, update: MatchUpdate) -> Result<Match> {
        let match_id = update.match_id.clone();
        let draw_policy = self.draw_policy;
        let result = self
            .ledger
            .with_match(&match_id, move |txn| {
                settlement::apply(txn, &update, draw_policy)
            })
            .await;

        match &result {
            Ok(mat) => info!(
                match_id = %mat.id(),
                status = %mat.status(),
                winner = mat.winner().map(|p| p.as_str()).unwrap_or("-"),
                "Match status updated"
            ),
            Err(err) if !err.is_retryable() => warn!(
                match_id = %match_id,
                error = %err,
                "Match update rejected"
            ),
            Err(_) => {}
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, MatchId, MatchStatus, ParticipantId};
    use crate::error::Error;
    use crate::testkit::{account, match_between, state_with, FaultPoint, MemoryLedger};
    use rust_decimal_macros::dec;

    fn service(draw_policy: DrawPolicy) -> (BettingService<MemoryLedger>, MemoryLedger) {
        let ledger = MemoryLedger::with_state(state_with(
            vec![account("u1", dec!(100))],
            vec![match_between("m1", "alpha", "beta")],
        ));
        let service = BettingService::new(ledger.clone(), PricingConfig::default(), draw_policy);
        (service, ledger)
    }

    fn request(amount: rust_decimal::Decimal) -> StakeRequest {
        StakeRequest {
            account_id: AccountId::new("u1"),
            match_id: MatchId::new("m1"),
            participant_id: ParticipantId::new("alpha"),
            amount,
        }
    }

    #[tokio::test]
    async fn placement_commits_through_the_facade() {
        let (service, ledger) = service(DrawPolicy::Reject);

        let stake = service.place_stake(request(dec!(5))).await.unwrap();
        assert_eq!(stake.odds(), dec!(2.00));

        let state = ledger.snapshot();
        assert_eq!(state.accounts[&AccountId::new("u1")].balance(), dec!(95));
        assert_eq!(state.stakes.len(), 1);
        assert!(state
            .quote_for(&MatchId::new("m1"), &ParticipantId::new("alpha"))
            .is_some());
    }

    #[tokio::test]
    async fn non_positive_amounts_never_reach_the_ledger() {
        let (service, ledger) = service(DrawPolicy::Reject);

        for amount in [dec!(0), dec!(-5)] {
            let err = service.place_stake(request(amount)).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Placement(PlacementError::InvalidAmount { .. })
            ));
        }
        assert!(ledger.snapshot().stakes.is_empty());
    }

    #[tokio::test]
    async fn ledger_fault_rolls_back_the_whole_placement() {
        let (service, ledger) = service(DrawPolicy::Reject);
        ledger.fail_on(FaultPoint::SaveAccount);

        let err = service.place_stake(request(dec!(5))).await.unwrap_err();
        assert!(err.is_retryable());

        // The debit, the stake and the quote refreshes all unwound.
        let state = ledger.snapshot();
        assert_eq!(state.accounts[&AccountId::new("u1")].balance(), dec!(100));
        assert!(state.stakes.is_empty());
        assert!(state.quotes.is_empty());

        // The fault was one-shot; a retry goes through.
        assert!(service.place_stake(request(dec!(5))).await.is_ok());
    }

    #[tokio::test]
    async fn settlement_credits_through_the_facade() {
        let (service, ledger) = service(DrawPolicy::Reject);

        service.place_stake(request(dec!(10))).await.unwrap();
        let mat = service
            .update_match_status(MatchUpdate {
                match_id: MatchId::new("m1"),
                status: MatchStatus::Completed,
                score: None,
                winner: Some(ParticipantId::new("alpha")),
            })
            .await
            .unwrap();

        assert_eq!(mat.status(), MatchStatus::Completed);
        // 10 at the 2.00 opening quote pays 20: 100 - 10 + 20.
        let state = ledger.snapshot();
        assert_eq!(state.accounts[&AccountId::new("u1")].balance(), dec!(110));
        assert_eq!(state.accounts[&AccountId::new("u1")].total_won(), dec!(20.00));
    }

    #[tokio::test]
    async fn configured_draw_policy_flows_into_settlement() {
        let (service, ledger) = service(DrawPolicy::Push);

        service.place_stake(request(dec!(10))).await.unwrap();
        service
            .update_match_status(MatchUpdate {
                match_id: MatchId::new("m1"),
                status: MatchStatus::Completed,
                score: Some((1, 1)),
                winner: None,
            })
            .await
            .unwrap();

        // Pushed, not won: the stake came back without winnings.
        let state = ledger.snapshot();
        assert_eq!(state.accounts[&AccountId::new("u1")].balance(), dec!(100));
        assert_eq!(state.accounts[&AccountId::new("u1")].total_won(), dec!(0));
    }
}
