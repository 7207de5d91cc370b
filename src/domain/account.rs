//! Account balance records mutated by placement and settlement.

use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};

/// A bettor's funds, referenced by stakes.
///
/// Balances move only inside match-scoped transactions: placement debits,
/// settlement credits. `total_staked` and `total_won` never decrease, so
/// they remain honest lifetime figures even after refunds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    balance: Amount,
    total_staked: Amount,
    total_won: Amount,
}

impl Account {
    /// Create an account record with explicit figures.
    #[must_use]
    pub fn new(id: AccountId, balance: Amount, total_staked: Amount, total_won: Amount) -> Self {
        Self {
            id,
            balance,
            total_staked,
            total_won,
        }
    }

    /// Open a fresh account with a starting balance.
    #[must_use]
    pub fn open(id: AccountId, balance: Amount) -> Self {
        Self::new(id, balance, Amount::ZERO, Amount::ZERO)
    }

    /// Get the account ID.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Funds available for staking.
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Lifetime sum of accepted stake amounts.
    #[must_use]
    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// Lifetime sum of credited winnings. Refunds are not winnings.
    #[must_use]
    pub fn total_won(&self) -> Amount {
        self.total_won
    }

    /// Withdraw a stake amount.
    ///
    /// Returns false and leaves the account untouched when the balance
    /// does not cover the amount; the balance can never go negative.
    #[must_use]
    pub fn debit(&mut self, amount: Amount) -> bool {
        if amount > self.balance {
            return false;
        }
        self.balance -= amount;
        self.total_staked += amount;
        true
    }

    /// Credit settled winnings.
    pub fn credit_winnings(&mut self, payout: Amount) {
        self.balance += payout;
        self.total_won += payout;
    }

    /// Credit funds without counting them as winnings (deposits, refunds).
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount;
    }
}
