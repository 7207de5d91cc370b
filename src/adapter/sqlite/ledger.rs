//! SQLite-backed transactional ledger.
//!
//! [`SqliteLedger::with_match`] pairs a per-match async gate with one
//! `BEGIN IMMEDIATE` transaction run on a blocking thread. The gate
//! serializes units of work per match across the whole process; the
//! immediate transaction takes SQLite's write lock up front so the
//! work never hits a mid-transaction upgrade deadlock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use diesel::prelude::*;
use tokio::sync::Mutex;

use crate::domain::{
    Account, AccountId, Amount, Match, MatchId, OddsQuote, ParticipantId, Stake, StakeStatus,
};
use crate::error::{LedgerError, Result};
use crate::port::{Ledger, LedgerTxn};

use super::connection::DbPool;
use super::model::{parse_decimal, AccountRow, MatchRow, OddsQuoteRow, StakeRow};
use super::schema::{accounts, matches, odds_quotes, stakes};

#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
    // One gate per match, created on first use and kept for the process
    // lifetime. Growth is bounded by the number of distinct matches.
    gates: Arc<DashMap<MatchId, Arc<Mutex<()>>>>,
    lock_wait: Duration,
}

impl SqliteLedger {
    #[must_use]
    pub fn new(pool: DbPool, lock_wait: Duration) -> Self {
        Self {
            pool,
            gates: Arc::new(DashMap::new()),
            lock_wait,
        }
    }

    fn gate(&self, match_id: &MatchId) -> Arc<Mutex<()>> {
        self.gates
            .entry(match_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Ledger for SqliteLedger {
    fn with_match<T, F>(
        &self,
        match_id: &MatchId,
        work: F,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T> + Send + 'static,
    {
        let gate = self.gate(match_id);
        let pool = self.pool.clone();
        let lock_wait = self.lock_wait;
        let match_id = match_id.clone();

        async move {
            let _guard = tokio::time::timeout(lock_wait, gate.lock())
                .await
                .map_err(|_| LedgerError::LockTimeout {
                    match_id: match_id.to_string(),
                    waited_ms: lock_wait.as_millis() as u64,
                })?;

            tokio::task::spawn_blocking(move || {
                let mut conn = pool
                    .get()
                    .map_err(|e| LedgerError::Connection(e.to_string()))?;
                conn.immediate_transaction(|conn| {
                    let mut txn = SqliteTxn { conn };
                    work(&mut txn)
                })
            })
            .await
            .map_err(|e| LedgerError::Task(e.to_string()))?
        }
    }
}

/// [`LedgerTxn`] over one open diesel transaction.
struct SqliteTxn<'a> {
    conn: &'a mut SqliteConnection,
}

impl LedgerTxn for SqliteTxn<'_> {
    fn match_by_id(&mut self, id: &MatchId) -> Result<Option<Match>> {
        let row: Option<MatchRow> = matches::table
            .find(id.as_str())
            .first(self.conn)
            .optional()?;
        row.map(MatchRow::into_domain).transpose()
    }

    fn save_match(&mut self, mat: &Match) -> Result<()> {
        let row = MatchRow::from_domain(mat);
        diesel::insert_into(matches::table)
            .values(&row)
            .on_conflict(matches::id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }

    fn account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>> {
        let row: Option<AccountRow> = accounts::table
            .find(id.as_str())
            .first(self.conn)
            .optional()?;
        row.map(AccountRow::into_domain).transpose()
    }

    fn save_account(&mut self, account: &Account) -> Result<()> {
        let row = AccountRow::from_domain(account);
        diesel::insert_into(accounts::table)
            .values(&row)
            .on_conflict(accounts::id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }

    fn insert_stake(&mut self, stake: &Stake) -> Result<()> {
        diesel::insert_into(stakes::table)
            .values(StakeRow::from_domain(stake))
            .execute(self.conn)?;
        Ok(())
    }

    fn save_stake(&mut self, stake: &Stake) -> Result<()> {
        let row = StakeRow::from_domain(stake);
        diesel::insert_into(stakes::table)
            .values(&row)
            .on_conflict(stakes::id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }

    fn pending_stakes(&mut self, id: &MatchId) -> Result<Vec<Stake>> {
        let rows: Vec<StakeRow> = stakes::table
            .filter(stakes::match_id.eq(id.as_str()))
            .filter(stakes::status.eq(StakeStatus::Pending.as_str()))
            .order(stakes::placed_at.asc())
            .load(self.conn)?;
        rows.into_iter().map(StakeRow::into_domain).collect()
    }

    fn stake_volumes(&mut self, id: &MatchId) -> Result<Vec<(ParticipantId, Amount)>> {
        let rows: Vec<(String, String)> = stakes::table
            .filter(stakes::match_id.eq(id.as_str()))
            .select((stakes::participant_id, stakes::amount))
            .load(self.conn)?;
        rows.into_iter()
            .map(|(participant, amount)| {
                Ok((ParticipantId::new(participant), parse_decimal(&amount)?))
            })
            .collect()
    }

    fn upsert_quote(&mut self, quote: &OddsQuote) -> Result<()> {
        let row = OddsQuoteRow::from_domain(quote);
        diesel::insert_into(odds_quotes::table)
            .values(&row)
            .on_conflict((odds_quotes::match_id, odds_quotes::participant_id))
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::connection::{create_pool, run_migrations};
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    // A file-backed database: every pooled connection must see the
    // same ledger, which pooled `:memory:` connections do not.
    fn ledger() -> (tempfile::TempDir, SqliteLedger) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteLedger::new(pool, Duration::from_millis(500)))
    }

    fn seed(ledger: &SqliteLedger) {
        let pool = ledger.pool.clone();
        let mut conn = pool.get().unwrap();
        let account = Account::open(AccountId::new("u1"), dec!(100));
        diesel::insert_into(accounts::table)
            .values(AccountRow::from_domain(&account))
            .execute(&mut conn)
            .unwrap();
        let mat = Match::scheduled(
            MatchId::new("m1"),
            ParticipantId::new("alpha"),
            ParticipantId::new("beta"),
        );
        diesel::insert_into(matches::table)
            .values(MatchRow::from_domain(&mat))
            .execute(&mut conn)
            .unwrap();
    }

    #[tokio::test]
    async fn committed_writes_are_visible_afterwards() {
        let (_dir, ledger) = ledger();
        seed(&ledger);

        ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let mut account = txn.account_by_id(&AccountId::new("u1"))?.unwrap();
                assert!(account.debit(dec!(30)));
                txn.save_account(&account)
            })
            .await
            .unwrap();

        let balance = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                Ok(txn.account_by_id(&AccountId::new("u1"))?.unwrap().balance())
            })
            .await
            .unwrap();
        assert_eq!(balance, dec!(70));
    }

    #[tokio::test]
    async fn an_error_rolls_back_every_write() {
        let (_dir, ledger) = ledger();
        seed(&ledger);

        let result: Result<()> = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let mut account = txn.account_by_id(&AccountId::new("u1"))?.unwrap();
                assert!(account.debit(dec!(30)));
                txn.save_account(&account)?;
                let stake = Stake::accept(
                    AccountId::new("u1"),
                    MatchId::new("m1"),
                    ParticipantId::new("alpha"),
                    dec!(30),
                    dec!(2.00),
                    Utc::now(),
                );
                txn.insert_stake(&stake)?;
                Err(LedgerError::Connection("wire cut".into()).into())
            })
            .await;
        assert!(result.is_err());

        let (balance, stakes) = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let balance = txn.account_by_id(&AccountId::new("u1"))?.unwrap().balance();
                let stakes = txn.stake_volumes(&MatchId::new("m1"))?;
                Ok((balance, stakes))
            })
            .await
            .unwrap();
        assert_eq!(balance, dec!(100));
        assert!(stakes.is_empty());
    }

    #[tokio::test]
    async fn reads_inside_the_transaction_see_its_writes() {
        let (_dir, ledger) = ledger();
        seed(&ledger);

        let pending = ledger
            .with_match(&MatchId::new("m1"), |txn| {
                let stake = Stake::accept(
                    AccountId::new("u1"),
                    MatchId::new("m1"),
                    ParticipantId::new("alpha"),
                    dec!(10),
                    dec!(2.00),
                    Utc::now(),
                );
                txn.insert_stake(&stake)?;
                txn.pending_stakes(&MatchId::new("m1"))
            })
            .await
            .unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount(), dec!(10));
    }

    #[tokio::test]
    async fn quote_upserts_replace_per_participant() {
        let (_dir, ledger) = ledger();
        seed(&ledger);

        ledger
            .with_match(&MatchId::new("m1"), |txn| {
                txn.upsert_quote(&OddsQuote::new(
                    MatchId::new("m1"),
                    ParticipantId::new("alpha"),
                    dec!(2.00),
                    Utc::now(),
                ))?;
                txn.upsert_quote(&OddsQuote::new(
                    MatchId::new("m1"),
                    ParticipantId::new("alpha"),
                    dec!(1.50),
                    Utc::now(),
                ))
            })
            .await
            .unwrap();

        let pool = ledger.pool.clone();
        let mut conn = pool.get().unwrap();
        let rows: Vec<OddsQuoteRow> = odds_quotes::table.load(&mut conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].odds, "1.50");
    }

    #[tokio::test]
    async fn waiting_out_a_busy_gate_times_out() {
        let (_dir, ledger) = ledger();
        seed(&ledger);

        let gate = ledger.gate(&MatchId::new("m1"));
        let held = gate.lock_owned().await;

        let result = ledger
            .with_match(&MatchId::new("m1"), |_txn| Ok(()))
            .await;

        assert!(matches!(
            result,
            Err(crate::error::Error::Ledger(LedgerError::LockTimeout { .. }))
        ));
        drop(held);

        let retry = ledger.with_match(&MatchId::new("m1"), |_txn| Ok(())).await;
        assert!(retry.is_ok());
    }
}
