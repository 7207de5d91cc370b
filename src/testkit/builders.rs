//! Builders for domain records used across tests.
//!
//! Concise factories so tests focus on assertions rather than
//! construction boilerplate.

use rust_decimal::Decimal;

use crate::domain::{Account, AccountId, Match, MatchId, ParticipantId};

use super::ledger::LedgerState;

/// An account with a balance and zeroed lifetime figures.
pub fn account(id: &str, balance: Decimal) -> Account {
    Account::open(AccountId::new(id), balance)
}

/// A scheduled match between two participants.
pub fn match_between(id: &str, side_a: &str, side_b: &str) -> Match {
    Match::scheduled(
        MatchId::new(id),
        ParticipantId::new(side_a),
        ParticipantId::new(side_b),
    )
}

/// Assemble prepared records into a ledger state.
pub fn state_with(accounts: Vec<Account>, matches: Vec<Match>) -> LedgerState {
    let mut state = LedgerState::default();
    for acct in accounts {
        state.accounts.insert(acct.id().clone(), acct);
    }
    for mat in matches {
        state.matches.insert(mat.id().clone(), mat);
    }
    state
}
