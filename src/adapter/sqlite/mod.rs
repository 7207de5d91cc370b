//! SQLite persistence for the ledger, via Diesel.

mod connection;
mod ledger;
mod model;
mod registry;
mod schema;

pub use connection::{create_pool, run_migrations, DbPool};
pub use ledger::SqliteLedger;
pub use registry::SqliteRegistry;
