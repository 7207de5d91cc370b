//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, embedded migrations, and per-connection
//! pragma setup for the SQLite ledger.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{LedgerError, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Type alias for one checked-out pool connection.
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled connection.
///
/// WAL lets readers run alongside the single writer, the busy timeout
/// rides out short lock contention, and SQLite keeps foreign keys off
/// unless switched on per connection.
#[derive(Debug)]
struct LedgerPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for LedgerPragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database path.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(5)
        .connection_customizer(Box::new(LedgerPragmas))
        .build(manager)
        .map_err(|e| LedgerError::Connection(e.to_string()).into())
}

/// Run all pending database migrations.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .map_err(|e| LedgerError::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| LedgerError::Connection(e.to_string()))?;
    Ok(())
}
