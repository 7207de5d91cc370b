//! Administrative and read-only access to the ledger database.
//!
//! The registry covers everything outside the match-scoped betting
//! flow: opening accounts, depositing funds, creating matches, and
//! the queries behind the board views. Writes that touch existing
//! rows run in their own immediate transaction; reads go straight
//! through a pooled connection.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::{
    opening_pair, Account, AccountId, Amount, Match, MatchId, OddsQuote, ParticipantId,
    PricingConfig, Side, Stake,
};
use crate::error::{Error, LedgerError, PlacementError, Result};

use super::connection::{DbConnection, DbPool};
use super::model::{parse_decimal, AccountRow, MatchRow, OddsQuoteRow, StakeRow};
use super::schema::{accounts, matches, odds_quotes, stakes};

pub struct SqliteRegistry {
    pool: DbPool,
}

impl SqliteRegistry {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        Ok(self
            .pool
            .get()
            .map_err(|e| LedgerError::Connection(e.to_string()))?)
    }

    /// Open a new account with a starting balance.
    ///
    /// The insert is strict: an existing ID surfaces as a database
    /// error rather than silently overwriting the balance.
    pub fn create_account(&self, id: &AccountId, opening_balance: Amount) -> Result<Account> {
        let account = Account::open(id.clone(), opening_balance);
        let mut conn = self.conn()?;
        diesel::insert_into(accounts::table)
            .values(AccountRow::from_domain(&account))
            .execute(&mut conn)?;
        Ok(account)
    }

    /// Add funds to an existing account.
    pub fn deposit(&self, id: &AccountId, amount: Amount) -> Result<Account> {
        if amount <= Amount::ZERO {
            return Err(PlacementError::InvalidAmount { amount }.into());
        }
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let row: Option<AccountRow> = accounts::table
                .find(id.as_str())
                .first(conn)
                .optional()?;
            let mut account = row.map(AccountRow::into_domain).transpose()?.ok_or_else(|| {
                PlacementError::AccountNotFound {
                    account_id: id.to_string(),
                }
            })?;
            account.credit(amount);
            let updated = AccountRow::from_domain(&account);
            diesel::insert_into(accounts::table)
                .values(&updated)
                .on_conflict(accounts::id)
                .do_update()
                .set(&updated)
                .execute(conn)?;
            Ok(account)
        })
    }

    /// Create a scheduled match and publish its opening quotes.
    pub fn create_match(
        &self,
        id: &MatchId,
        side_a: &ParticipantId,
        side_b: &ParticipantId,
        pricing: &PricingConfig,
    ) -> Result<Match> {
        let mat = Match::scheduled(id.clone(), side_a.clone(), side_b.clone());
        let opening = opening_pair(pricing);
        let now = Utc::now();
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            diesel::insert_into(matches::table)
                .values(MatchRow::from_domain(&mat))
                .execute(conn)?;
            for side in [Side::A, Side::B] {
                let quote = OddsQuote::new(
                    id.clone(),
                    mat.participant(side).clone(),
                    opening.for_side(side),
                    now,
                );
                let row = OddsQuoteRow::from_domain(&quote);
                diesel::insert_into(odds_quotes::table)
                    .values(&row)
                    .on_conflict((odds_quotes::match_id, odds_quotes::participant_id))
                    .do_update()
                    .set(&row)
                    .execute(conn)?;
            }
            Ok::<(), Error>(())
        })?;
        Ok(mat)
    }

    pub fn account(&self, id: &AccountId) -> Result<Option<Account>> {
        let mut conn = self.conn()?;
        let row: Option<AccountRow> = accounts::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()?;
        row.map(AccountRow::into_domain).transpose()
    }

    pub fn match_by_id(&self, id: &MatchId) -> Result<Option<Match>> {
        let mut conn = self.conn()?;
        let row: Option<MatchRow> = matches::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()?;
        row.map(MatchRow::into_domain).transpose()
    }

    pub fn matches(&self) -> Result<Vec<Match>> {
        let mut conn = self.conn()?;
        let rows: Vec<MatchRow> = matches::table.order(matches::id.asc()).load(&mut conn)?;
        rows.into_iter().map(MatchRow::into_domain).collect()
    }

    pub fn quotes(&self, match_id: &MatchId) -> Result<Vec<OddsQuote>> {
        let mut conn = self.conn()?;
        let rows: Vec<OddsQuoteRow> = odds_quotes::table
            .filter(odds_quotes::match_id.eq(match_id.as_str()))
            .order(odds_quotes::participant_id.asc())
            .load(&mut conn)?;
        rows.into_iter().map(OddsQuoteRow::into_domain).collect()
    }

    pub fn stakes_for_match(&self, match_id: &MatchId) -> Result<Vec<Stake>> {
        let mut conn = self.conn()?;
        let rows: Vec<StakeRow> = stakes::table
            .filter(stakes::match_id.eq(match_id.as_str()))
            .order(stakes::placed_at.asc())
            .load(&mut conn)?;
        rows.into_iter().map(StakeRow::into_domain).collect()
    }

    /// Total staked volume per side of a match.
    pub fn pool_volumes(&self, match_id: &MatchId) -> Result<(Amount, Amount)> {
        let mut conn = self.conn()?;
        let row: Option<MatchRow> = matches::table
            .find(match_id.as_str())
            .first(&mut conn)
            .optional()?;
        let mat = row.map(MatchRow::into_domain).transpose()?.ok_or_else(|| {
            PlacementError::MatchNotFound {
                match_id: match_id.to_string(),
            }
        })?;

        let rows: Vec<(String, String)> = stakes::table
            .filter(stakes::match_id.eq(match_id.as_str()))
            .select((stakes::participant_id, stakes::amount))
            .load(&mut conn)?;

        let mut volume_a = Amount::ZERO;
        let mut volume_b = Amount::ZERO;
        for (participant, amount) in rows {
            let amount = parse_decimal(&amount)?;
            // Placement validated the participant, so both sides resolve.
            match mat.side_of(&ParticipantId::new(participant)) {
                Some(Side::A) => volume_a += amount,
                Some(Side::B) => volume_b += amount,
                None => {}
            }
        }
        Ok((volume_a, volume_b))
    }
}
