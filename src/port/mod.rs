//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the extension points of the hexagonal architecture: the
//! services in this crate talk to storage exclusively through them, and
//! adapters implement them. The ledger port is deliberately narrow. Its
//! one primitive supplies the per-match lock and the transaction
//! together, so no caller can reach the records outside that discipline.

mod ledger;

pub use ledger::{Ledger, LedgerTxn};
