//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`]: [`MemoryLedger`], an in-memory [`Ledger`](crate::port::Ledger)
//!   with commit-on-success transactions and fault injection.
//! - [`builders`]: factories for accounts, matches and seeded states.

pub mod builders;
pub mod ledger;

pub use builders::{account, match_between, state_with};
pub use ledger::{FaultPoint, LedgerState, MemoryLedger, MemoryTxn};
