//! Ledger port for the durable betting records.
//!
//! This module defines the transactional seam between the betting
//! services and whatever stores accounts, matches, stakes and quotes.

use std::future::Future;

use crate::domain::{Account, AccountId, Amount, Match, MatchId, OddsQuote, ParticipantId, Stake};
use crate::error::Result;

/// Ledger operations available inside one transaction.
///
/// A unit of work receives this through [`Ledger::with_match`], and
/// everything it reads or writes shares the transaction's fate: reads see
/// the work's own writes, and an `Err` return rolls the whole lot back.
pub trait LedgerTxn {
    /// Load a match by ID.
    fn match_by_id(&mut self, id: &MatchId) -> Result<Option<Match>>;

    /// Persist a match, replacing the stored record.
    fn save_match(&mut self, mat: &Match) -> Result<()>;

    /// Load an account by ID.
    fn account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>>;

    /// Persist an account, replacing the stored record.
    fn save_account(&mut self, account: &Account) -> Result<()>;

    /// Record a newly accepted stake.
    fn insert_stake(&mut self, stake: &Stake) -> Result<()>;

    /// Persist a settled stake, replacing the stored record.
    fn save_stake(&mut self, stake: &Stake) -> Result<()>;

    /// All pending stakes riding on a match.
    fn pending_stakes(&mut self, id: &MatchId) -> Result<Vec<Stake>>;

    /// Staked amount per backed participant for a match, any status.
    ///
    /// One entry per stake; callers fold the pools they need.
    fn stake_volumes(&mut self, id: &MatchId) -> Result<Vec<(ParticipantId, Amount)>>;

    /// Publish a quote, replacing any previous one for the same
    /// match and participant.
    fn upsert_quote(&mut self, quote: &OddsQuote) -> Result<()>;
}

/// The transactional ledger store.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `with_match` provides both the exclusive per-match lock and the
///   storage transaction: units of work for one match run strictly one
///   after another, while different matches proceed independently
/// - The lock is held from before the transaction begins until after it
///   commits or rolls back
/// - Lock acquisition is bounded; implementations fail with
///   `LedgerError::LockTimeout` instead of queueing forever
pub trait Ledger: Send + Sync {
    /// Run a unit of work inside one transaction scoped to `match_id`.
    ///
    /// The work's `Err` aborts the transaction; nothing it wrote
    /// survives. The same error is handed back to the caller.
    fn with_match<T, F>(
        &self,
        match_id: &MatchId,
        work: F,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T> + Send + 'static;
}
