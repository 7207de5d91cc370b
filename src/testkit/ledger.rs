//! In-memory ledger with real transactional semantics.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{
    Account, AccountId, Amount, Match, MatchId, OddsQuote, ParticipantId, Stake, StakeId,
};
use crate::error::{LedgerError, Result};
use crate::port::{Ledger, LedgerTxn};

/// Ledger operations that can be armed to fail, for atomicity tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    MatchById,
    SaveMatch,
    AccountById,
    SaveAccount,
    InsertStake,
    SaveStake,
    PendingStakes,
    StakeVolumes,
    UpsertQuote,
}

/// Plain in-memory records backing [`MemoryLedger`].
///
/// Fields are public so tests can seed and inspect them directly.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub accounts: HashMap<AccountId, Account>,
    pub matches: HashMap<MatchId, Match>,
    pub stakes: Vec<Stake>,
    pub quotes: HashMap<(MatchId, ParticipantId), OddsQuote>,
}

impl LedgerState {
    /// Find a stake by ID.
    #[must_use]
    pub fn stake(&self, id: StakeId) -> Option<&Stake> {
        self.stakes.iter().find(|s| s.id() == id)
    }

    /// The published quote for one participant of one match.
    #[must_use]
    pub fn quote_for(&self, match_id: &MatchId, participant: &ParticipantId) -> Option<&OddsQuote> {
        self.quotes.get(&(match_id.clone(), participant.clone()))
    }

    /// Total staked volume on one participant, any stake status.
    #[must_use]
    pub fn volume_for(&self, match_id: &MatchId, participant: &ParticipantId) -> Amount {
        self.stakes
            .iter()
            .filter(|s| s.match_id() == match_id && s.participant_id() == participant)
            .map(Stake::amount)
            .fold(Amount::ZERO, |acc, amount| acc + amount)
    }
}

/// One unit of work over borrowed records.
///
/// [`MemoryLedger::with_match`] hands this to the work closure over a
/// scratch copy of the state; unit tests can also wrap bare state with
/// [`MemoryTxn::new`] to drive a work function directly.
pub struct MemoryTxn<'a> {
    state: &'a mut LedgerState,
    faults: Option<&'a Mutex<HashMap<FaultPoint, u32>>>,
}

impl<'a> MemoryTxn<'a> {
    /// Wrap bare state, with no fault injection.
    pub fn new(state: &'a mut LedgerState) -> Self {
        Self {
            state,
            faults: None,
        }
    }

    fn trip(&mut self, point: FaultPoint) -> Result<()> {
        let Some(faults) = self.faults else {
            return Ok(());
        };
        let mut armed = faults.lock();
        if let Some(remaining) = armed.get_mut(&point) {
            *remaining -= 1;
            if *remaining == 0 {
                armed.remove(&point);
                return Err(LedgerError::Connection(format!("injected fault: {point:?}")).into());
            }
        }
        Ok(())
    }
}

impl LedgerTxn for MemoryTxn<'_> {
    fn match_by_id(&mut self, id: &MatchId) -> Result<Option<Match>> {
        self.trip(FaultPoint::MatchById)?;
        Ok(self.state.matches.get(id).cloned())
    }

    fn save_match(&mut self, mat: &Match) -> Result<()> {
        self.trip(FaultPoint::SaveMatch)?;
        self.state.matches.insert(mat.id().clone(), mat.clone());
        Ok(())
    }

    fn account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>> {
        self.trip(FaultPoint::AccountById)?;
        Ok(self.state.accounts.get(id).cloned())
    }

    fn save_account(&mut self, account: &Account) -> Result<()> {
        self.trip(FaultPoint::SaveAccount)?;
        self.state
            .accounts
            .insert(account.id().clone(), account.clone());
        Ok(())
    }

    fn insert_stake(&mut self, stake: &Stake) -> Result<()> {
        self.trip(FaultPoint::InsertStake)?;
        self.state.stakes.push(stake.clone());
        Ok(())
    }

    fn save_stake(&mut self, stake: &Stake) -> Result<()> {
        self.trip(FaultPoint::SaveStake)?;
        if let Some(slot) = self.state.stakes.iter_mut().find(|s| s.id() == stake.id()) {
            *slot = stake.clone();
        } else {
            self.state.stakes.push(stake.clone());
        }
        Ok(())
    }

    fn pending_stakes(&mut self, id: &MatchId) -> Result<Vec<Stake>> {
        self.trip(FaultPoint::PendingStakes)?;
        Ok(self
            .state
            .stakes
            .iter()
            .filter(|s| s.match_id() == id && s.status().is_pending())
            .cloned()
            .collect())
    }

    fn stake_volumes(&mut self, id: &MatchId) -> Result<Vec<(ParticipantId, Amount)>> {
        self.trip(FaultPoint::StakeVolumes)?;
        Ok(self
            .state
            .stakes
            .iter()
            .filter(|s| s.match_id() == id)
            .map(|s| (s.participant_id().clone(), s.amount()))
            .collect())
    }

    fn upsert_quote(&mut self, quote: &OddsQuote) -> Result<()> {
        self.trip(FaultPoint::UpsertQuote)?;
        self.state.quotes.insert(
            (quote.match_id().clone(), quote.participant_id().clone()),
            quote.clone(),
        );
        Ok(())
    }
}

/// In-memory [`Ledger`] with commit-on-success transactions.
///
/// The unit of work runs against a scratch copy of the records; `Ok`
/// replaces the shared state, `Err` discards the copy, so rollback
/// behaves like the real store. One global mutex serializes all matches,
/// which over-satisfies the per-match discipline.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    faults: Arc<Mutex<HashMap<FaultPoint, u32>>>,
}

impl MemoryLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger starting from prepared records.
    #[must_use]
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            faults: Arc::default(),
        }
    }

    /// Arm the next call of `point` to fail with a ledger error.
    pub fn fail_on(&self, point: FaultPoint) {
        self.fail_on_call(point, 1);
    }

    /// Arm the `n`-th call of `point` from now (1-based) to fail.
    pub fn fail_on_call(&self, point: FaultPoint, n: u32) {
        self.faults.lock().insert(point, n);
    }

    /// Snapshot of the current records.
    #[must_use]
    pub fn snapshot(&self) -> LedgerState {
        self.state.lock().clone()
    }
}

impl Ledger for MemoryLedger {
    fn with_match<T, F>(
        &self,
        _match_id: &MatchId,
        work: F,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let faults = Arc::clone(&self.faults);
        async move {
            let mut guard = state.lock();
            let mut scratch = guard.clone();
            let mut txn = MemoryTxn {
                state: &mut scratch,
                faults: Some(&faults),
            };
            let value = work(&mut txn)?;
            *guard = scratch;
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Account;
    use rust_decimal_macros::dec;

    fn seeded() -> MemoryLedger {
        let mut state = LedgerState::default();
        state.accounts.insert(
            AccountId::new("u1"),
            Account::open(AccountId::new("u1"), dec!(100)),
        );
        MemoryLedger::with_state(state)
    }

    #[tokio::test]
    async fn commit_applies_writes() {
        let ledger = seeded();

        ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let mut account = txn.account_by_id(&AccountId::new("u1"))?.unwrap();
                assert!(account.debit(dec!(40)));
                txn.save_account(&account)
            })
            .await
            .unwrap();

        let state = ledger.snapshot();
        assert_eq!(
            state.accounts[&AccountId::new("u1")].balance(),
            dec!(60)
        );
    }

    #[tokio::test]
    async fn error_discards_all_writes() {
        let ledger = seeded();

        let result: Result<()> = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let mut account = txn.account_by_id(&AccountId::new("u1"))?.unwrap();
                assert!(account.debit(dec!(40)));
                txn.save_account(&account)?;
                Err(LedgerError::Connection("lost".into()).into())
            })
            .await;

        assert!(result.is_err());
        let state = ledger.snapshot();
        assert_eq!(
            state.accounts[&AccountId::new("u1")].balance(),
            dec!(100)
        );
    }

    #[tokio::test]
    async fn armed_fault_fires_on_the_requested_call() {
        let ledger = seeded();
        ledger.fail_on_call(FaultPoint::AccountById, 2);

        let result = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                txn.account_by_id(&AccountId::new("u1"))?; // first call fine
                txn.account_by_id(&AccountId::new("u1"))?; // second trips
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(crate::error::Error::Ledger(LedgerError::Connection(_)))
        ));
    }
}
