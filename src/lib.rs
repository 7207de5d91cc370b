//! Toteboard - pari-mutuel odds engine and bet-settlement ledger.
//!
//! This crate quotes decimal odds for two-party matches from pooled
//! stake volumes, accepts stakes at the quoted price, and settles the
//! book when a result comes in, with every balance movement inside one
//! match-scoped storage transaction.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - storage-agnostic types and the odds calculator:
//!   accounts, matches, stakes, quotes, pari-mutuel pricing
//! - **`port`** - the `Ledger` trait: one primitive, `with_match`,
//!   running a unit of work under an exclusive per-match lock inside
//!   a single transaction
//! - **`adapter`** - SQLite implementation of the port (Diesel, r2d2,
//!   embedded migrations) plus the registry surface for accounts,
//!   matches, and board queries
//! - **`service`** - placement and settlement flows composed into the
//!   `BettingService` facade
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Odds math and ledger record types
//! - [`error`] - Error types for the crate
//! - [`port`] - Trait definitions for ledger implementations
//! - [`adapter`] - SQLite persistence
//! - [`service`] - Placement and settlement orchestration
//! - [`app`] - Application wiring for the CLI and hosts
//! - [`cli`] - The `toteboard` command-line interface
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toteboard::domain::{quote, PricingConfig};
//!
//! // 10 staked on side A, 5 on side B, default prior of 5 per side.
//! let pair = quote(dec!(10), dec!(5), &PricingConfig::default());
//! assert_eq!(pair.side_a, dec!(1.67));
//! assert_eq!(pair.side_b, dec!(2.50));
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
