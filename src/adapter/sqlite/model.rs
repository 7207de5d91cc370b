//! Database model types for Diesel ORM.
//!
//! Monetary figures and odds are stored as TEXT and parsed back into
//! `Decimal`, so the database never does float arithmetic on them.
//! Timestamps are RFC 3339 TEXT.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{
    Account, AccountId, Match, MatchId, OddsQuote, ParticipantId, Stake, StakeId,
};
use crate::error::{LedgerError, Result};

use super::schema::{accounts, matches, odds_quotes, stakes};

/// Database row for an account.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRow {
    pub id: String,
    pub balance: String,
    pub total_staked: String,
    pub total_won: String,
}

impl AccountRow {
    pub fn from_domain(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            balance: account.balance().to_string(),
            total_staked: account.total_staked().to_string(),
            total_won: account.total_won().to_string(),
        }
    }

    pub fn into_domain(self) -> Result<Account> {
        Ok(Account::new(
            AccountId::new(self.id),
            parse_decimal(&self.balance)?,
            parse_decimal(&self.total_staked)?,
            parse_decimal(&self.total_won)?,
        ))
    }
}

/// Database row for a match.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct MatchRow {
    pub id: String,
    pub side_a: String,
    pub side_b: String,
    pub status: String,
    pub winner: Option<String>,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
}

impl MatchRow {
    pub fn from_domain(mat: &Match) -> Self {
        Self {
            id: mat.id().to_string(),
            side_a: mat.side_a().to_string(),
            side_b: mat.side_b().to_string(),
            status: mat.status().to_string(),
            winner: mat.winner().map(ToString::to_string),
            score_a: mat.score_a().map(|s| s as i32),
            score_b: mat.score_b().map(|s| s as i32),
        }
    }

    pub fn into_domain(self) -> Result<Match> {
        let status = self.status.parse().map_err(LedgerError::Parse)?;
        Ok(Match::new(
            MatchId::new(self.id),
            ParticipantId::new(self.side_a),
            ParticipantId::new(self.side_b),
            status,
            self.winner.map(ParticipantId::new),
            self.score_a.map(|s| s as u32),
            self.score_b.map(|s| s as u32),
        ))
    }
}

/// Database row for a stake.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = stakes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct StakeRow {
    pub id: String,
    pub account_id: String,
    pub match_id: String,
    pub participant_id: String,
    pub amount: String,
    pub odds: String,
    pub payout: String,
    pub status: String,
    pub placed_at: String,
    pub settled_at: Option<String>,
}

impl StakeRow {
    pub fn from_domain(stake: &Stake) -> Self {
        Self {
            id: stake.id().to_string(),
            account_id: stake.account_id().to_string(),
            match_id: stake.match_id().to_string(),
            participant_id: stake.participant_id().to_string(),
            amount: stake.amount().to_string(),
            odds: stake.odds().to_string(),
            payout: stake.payout().to_string(),
            status: stake.status().to_string(),
            placed_at: stake.placed_at().to_rfc3339(),
            settled_at: stake.settled_at().map(|t| t.to_rfc3339()),
        }
    }

    pub fn into_domain(self) -> Result<Stake> {
        let id = StakeId::from_str(&self.id)
            .map_err(|e| LedgerError::Parse(format!("bad stake id {:?}: {e}", self.id)))?;
        let status = self.status.parse().map_err(LedgerError::Parse)?;
        let settled_at = self.settled_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(Stake::new(
            id,
            AccountId::new(self.account_id),
            MatchId::new(self.match_id),
            ParticipantId::new(self.participant_id),
            parse_decimal(&self.amount)?,
            parse_decimal(&self.odds)?,
            parse_decimal(&self.payout)?,
            status,
            parse_timestamp(&self.placed_at)?,
            settled_at,
        ))
    }
}

/// Database row for a published odds quote.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = odds_quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OddsQuoteRow {
    pub match_id: String,
    pub participant_id: String,
    pub odds: String,
    pub updated_at: String,
}

impl OddsQuoteRow {
    pub fn from_domain(quote: &OddsQuote) -> Self {
        Self {
            match_id: quote.match_id().to_string(),
            participant_id: quote.participant_id().to_string(),
            odds: quote.odds().to_string(),
            updated_at: quote.updated_at().to_rfc3339(),
        }
    }

    pub fn into_domain(self) -> Result<OddsQuote> {
        Ok(OddsQuote::new(
            MatchId::new(self.match_id),
            ParticipantId::new(self.participant_id),
            parse_decimal(&self.odds)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}

pub(super) fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s)
        .map_err(|e| LedgerError::Parse(format!("bad decimal {s:?}: {e}")).into())
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LedgerError::Parse(format!("bad timestamp {s:?}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchStatus, Side, StakeStatus};
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn account_survives_the_row_trip() {
        let account = Account::new(
            AccountId::new("u1"),
            dec!(95.50),
            dec!(4.50),
            dec!(0),
        );

        let back = AccountRow::from_domain(&account).into_domain().unwrap();

        assert_eq!(back, account);
        assert_eq!(back.balance(), dec!(95.50));
    }

    #[test]
    fn match_survives_the_row_trip() {
        let mut mat = Match::scheduled(
            MatchId::new("m1"),
            ParticipantId::new("alpha"),
            ParticipantId::new("beta"),
        );
        assert!(mat.transition(MatchStatus::Completed));
        mat.record_score(3, 1);
        mat.set_winner(Side::A);

        let back = MatchRow::from_domain(&mat).into_domain().unwrap();

        assert_eq!(back, mat);
        assert_eq!(back.winner().unwrap().as_str(), "alpha");
        assert_eq!(back.score_a(), Some(3));
    }

    #[test]
    fn stake_survives_the_row_trip() {
        let mut stake = Stake::accept(
            AccountId::new("u1"),
            MatchId::new("m1"),
            ParticipantId::new("alpha"),
            dec!(5.00),
            dec!(2.00),
            Utc::now(),
        );
        assert!(stake.mark_won(Utc::now()));

        let back = StakeRow::from_domain(&stake).into_domain().unwrap();

        assert_eq!(back.id(), stake.id());
        assert_eq!(back.status(), StakeStatus::Won);
        assert_eq!(back.payout(), dec!(10.00));
        assert!(back.settled_at().is_some());
    }

    #[test]
    fn quote_survives_the_row_trip() {
        let quote = OddsQuote::new(
            MatchId::new("m1"),
            ParticipantId::new("alpha"),
            dec!(1.50),
            Utc::now(),
        );

        let back = OddsQuoteRow::from_domain(&quote).into_domain().unwrap();

        assert_eq!(back.odds(), dec!(1.50));
        assert_eq!(back.participant_id().as_str(), "alpha");
    }

    #[test]
    fn garbage_decimal_is_a_parse_error() {
        let row = AccountRow {
            id: "u1".to_string(),
            balance: "not-a-number".to_string(),
            total_staked: "0".to_string(),
            total_won: "0".to_string(),
        };

        let err = row.into_domain().unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::Parse(_))));
    }

    #[test]
    fn garbage_status_is_a_parse_error() {
        let row = MatchRow {
            id: "m1".to_string(),
            side_a: "alpha".to_string(),
            side_b: "beta".to_string(),
            status: "paused".to_string(),
            winner: None,
            score_a: None,
            score_b: None,
        };

        let err = row.into_domain().unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::Parse(_))));
    }

    #[test]
    fn decimal_text_keeps_its_scale() {
        // "95.50" must come back as 95.50, not 95.5 widened elsewhere.
        assert_eq!(dec!(95.50).to_string(), "95.50");
        assert_eq!(parse_decimal("95.50").unwrap(), dec!(95.50));
    }
}
