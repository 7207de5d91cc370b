//! Stake records and their settlement transitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{round_money, AccountId, Amount, MatchId, Odds, ParticipantId, StakeId};

/// Resolution state of a stake.
///
/// `Pending` is the only live state; the others are terminal. `Void`
/// is reachable only through a drawn match under the push draw policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeStatus {
    Pending,
    Won,
    Lost,
    Void,
}

impl StakeStatus {
    /// Returns true while the stake awaits settlement.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, StakeStatus::Pending)
    }

    /// Stable lowercase name, used for storage and display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StakeStatus::Pending => "pending",
            StakeStatus::Won => "won",
            StakeStatus::Lost => "lost",
            StakeStatus::Void => "void",
        }
    }
}

impl fmt::Display for StakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StakeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StakeStatus::Pending),
            "won" => Ok(StakeStatus::Won),
            "lost" => Ok(StakeStatus::Lost),
            "void" => Ok(StakeStatus::Void),
            other => Err(format!("unknown stake status: {other}")),
        }
    }
}

/// An accepted bet.
///
/// `odds` is the quote snapshot taken at acceptance and is never
/// recomputed. `payout` holds the potential payout (amount × odds,
/// rounded to 2 dp) until settlement replaces it with the realized
/// figure: unchanged for winners, zero for losers, the original amount
/// for voided stakes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stake {
    id: StakeId,
    account_id: AccountId,
    match_id: MatchId,
    participant_id: ParticipantId,
    amount: Amount,
    odds: Odds,
    payout: Amount,
    status: StakeStatus,
    placed_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
}

impl Stake {
    /// Create a stake record with explicit state.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: StakeId,
        account_id: AccountId,
        match_id: MatchId,
        participant_id: ParticipantId,
        amount: Amount,
        odds: Odds,
        payout: Amount,
        status: StakeStatus,
        placed_at: DateTime<Utc>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            account_id,
            match_id,
            participant_id,
            amount,
            odds,
            payout,
            status,
            placed_at,
            settled_at,
        }
    }

    /// Accept a new stake at the quoted odds.
    ///
    /// Generates the ID and locks in the potential payout.
    #[must_use]
    pub fn accept(
        account_id: AccountId,
        match_id: MatchId,
        participant_id: ParticipantId,
        amount: Amount,
        odds: Odds,
        placed_at: DateTime<Utc>,
    ) -> Self {
        let payout = round_money(amount * odds);
        Self::new(
            StakeId::generate(),
            account_id,
            match_id,
            participant_id,
            amount,
            odds,
            payout,
            StakeStatus::Pending,
            placed_at,
            None,
        )
    }

    /// Get the stake ID.
    #[must_use]
    pub fn id(&self) -> StakeId {
        self.id
    }

    /// Get the staking account.
    #[must_use]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Get the match the stake rides on.
    #[must_use]
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Get the backed participant.
    #[must_use]
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Get the staked amount.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Get the odds snapshot taken at acceptance.
    #[must_use]
    pub fn odds(&self) -> Odds {
        self.odds
    }

    /// Get the payout figure (potential until settled, realized after).
    #[must_use]
    pub fn payout(&self) -> Amount {
        self.payout
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> StakeStatus {
        self.status
    }

    /// When the stake was accepted.
    #[must_use]
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// When the stake was settled, if it has been.
    #[must_use]
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    /// Settle as a winner. The payout stays at the acceptance figure.
    ///
    /// Returns false and changes nothing unless the stake is pending.
    #[must_use]
    pub fn mark_won(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = StakeStatus::Won;
        self.settled_at = Some(at);
        true
    }

    /// Settle as a loser. The realized payout is zero.
    ///
    /// Returns false and changes nothing unless the stake is pending.
    #[must_use]
    pub fn mark_lost(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = StakeStatus::Lost;
        self.payout = Amount::ZERO;
        self.settled_at = Some(at);
        true
    }

    /// Void the stake on a pushed draw. The realized payout is the refund.
    ///
    /// Returns false and changes nothing unless the stake is pending.
    #[must_use]
    pub fn mark_void(&mut self, at: DateTime<Utc>) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = StakeStatus::Void;
        self.payout = self.amount;
        self.settled_at = Some(at);
        true
    }
}
