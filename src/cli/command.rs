//! Command-line interface definitions.
//!
//! Defines the CLI structure for the toteboard binary using `clap`.
//! Subcommands seed the ledger, place stakes, record results, render
//! the quote board, and run a concurrent placement simulation.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::MatchStatus;

/// Pari-mutuel odds board and bet-settlement ledger CLI
#[derive(Parser, Debug)]
#[command(name = "toteboard")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the toteboard CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create demo accounts and a match with opening quotes
    Seed(SeedArgs),

    /// Place a stake on a match participant
    Place(PlaceArgs),

    /// Record a match result and settle its stakes
    Result(ResultArgs),

    /// Show the quote board, or one match in detail
    Board(BoardArgs),

    /// Fire concurrent random placements at one match
    Simulate(SimulateArgs),
}

/// Arguments for the `seed` subcommand.
///
/// Seeding is idempotent: accounts and matches that already exist are
/// left untouched, so the command can top up a demo database at any
/// point without resetting balances.
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Number of demo accounts to ensure (u1, u2, ...)
    #[arg(long, default_value = "4")]
    pub accounts: u32,

    /// Opening balance for newly created accounts
    #[arg(long, default_value = "100")]
    pub balance: Decimal,

    /// Match to create
    #[arg(long = "match", default_value = "m1")]
    pub match_id: String,

    /// First participant
    #[arg(long, default_value = "alpha")]
    pub side_a: String,

    /// Second participant
    #[arg(long, default_value = "beta")]
    pub side_b: String,
}

/// Arguments for the `place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Account paying the stake
    #[arg(long)]
    pub account: String,

    /// Match to bet on
    #[arg(long = "match")]
    pub match_id: String,

    /// Participant backed by the stake
    #[arg(long)]
    pub participant: String,

    /// Stake amount
    #[arg(long)]
    pub amount: Decimal,
}

/// Arguments for the `result` subcommand.
#[derive(Parser, Debug)]
pub struct ResultArgs {
    /// Match to update
    #[arg(long = "match")]
    pub match_id: String,

    /// New status [scheduled, live, completed]
    #[arg(long)]
    pub status: MatchStatus,

    /// Final score as A:B, e.g. 3:1
    #[arg(long, value_parser = parse_score)]
    pub score: Option<(u32, u32)>,

    /// Explicit winner, overrides the score
    #[arg(long)]
    pub winner: Option<String>,
}

/// Arguments for the `board` subcommand.
#[derive(Parser, Debug)]
pub struct BoardArgs {
    /// Show one match in detail, including its stakes
    #[arg(long = "match")]
    pub match_id: Option<String>,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Match to bet on
    #[arg(long = "match", default_value = "m1")]
    pub match_id: String,

    /// Number of concurrent bettors
    #[arg(long, default_value = "8")]
    pub bettors: u32,

    /// Stakes each bettor places
    #[arg(long, default_value = "10")]
    pub stakes: u32,

    /// Upper bound for each random stake amount
    #[arg(long, default_value = "10")]
    pub max_amount: u32,
}

/// Parse a `score_a:score_b` pair.
fn parse_score(raw: &str) -> Result<(u32, u32), String> {
    let (a, b) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected A:B, got {raw:?}"))?;
    let a = a
        .trim()
        .parse()
        .map_err(|e| format!("bad score for side A: {e}"))?;
    let b = b
        .trim()
        .parse()
        .map_err(|e| format!("bad score for side B: {e}"))?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_pairs_parse() {
        assert_eq!(parse_score("3:1"), Ok((3, 1)));
        assert_eq!(parse_score(" 0 : 0 "), Ok((0, 0)));
        assert!(parse_score("31").is_err());
        assert!(parse_score("a:b").is_err());
    }

    #[test]
    fn cli_parses_a_place_command() {
        let cli = Cli::parse_from([
            "toteboard", "place", "--account", "u1", "--match", "m1", "--participant", "alpha",
            "--amount", "5.00",
        ]);
        match cli.command {
            Commands::Place(args) => {
                assert_eq!(args.account, "u1");
                assert_eq!(args.amount, rust_decimal_macros::dec!(5.00));
            }
            other => panic!("parsed wrong command: {other:?}"),
        }
    }
}
