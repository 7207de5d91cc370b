use thiserror::Error;

use crate::domain::{Amount, MatchStatus};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Functional rejections from stake placement.
///
/// The client can correct the request and resubmit; the placement
/// transaction rolled back, so nothing was persisted.
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("betting closed: match {match_id} is {status}")]
    BettingClosed {
        match_id: String,
        status: MatchStatus,
    },

    #[error("participant {participant_id} is not in match {match_id}")]
    ParticipantNotInMatch {
        participant_id: String,
        match_id: String,
    },

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("invalid stake amount: {amount}")]
    InvalidAmount { amount: Amount },
}

/// Functional rejections from match status updates and settlement.
#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("invalid transition for match {match_id}: {from} -> {to}")]
    InvalidTransition {
        match_id: String,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("winner {winner} is not in match {match_id}")]
    WinnerNotInMatch { winner: String, match_id: String },

    #[error("ambiguous winner for match {match_id}: scores level and no explicit winner")]
    AmbiguousWinner { match_id: String },

    #[error("unknown outcome for match {match_id}: completed without winner or scores")]
    UnknownOutcome { match_id: String },
}

/// Infrastructure failures from the ledger store.
///
/// Opaque to callers and safe to retry wholesale: the enclosing
/// transaction never commits once one of these surfaces.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("lock timeout: match {match_id} still busy after {waited_ms} ms")]
    LockTimeout { match_id: String, waited_ms: u64 },

    #[error("background task failed: {0}")]
    Task(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("corrupt ledger: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether retrying the same call can succeed.
    ///
    /// True only for ledger failures: their transaction rolled back
    /// wholesale, so a retry starts from a clean slate. Functional
    /// rejections stay final until the client changes the request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Ledger(_))
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Ledger(LedgerError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn only_ledger_errors_are_retryable() {
        let functional: Error = PlacementError::InsufficientBalance {
            available: dec!(3.00),
            required: dec!(5.00),
        }
        .into();
        let infrastructural: Error = LedgerError::Connection("pool exhausted".into()).into();

        assert!(!functional.is_retryable());
        assert!(infrastructural.is_retryable());
    }
}
