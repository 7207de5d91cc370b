//! Application wiring.
//!
//! Builds the SQLite-backed betting service and registry from a loaded
//! configuration. The CLI and integration tests both bootstrap through
//! here, so every entry point shares the same pool, pragmas, and
//! migration run.

use std::time::Duration;

use crate::adapter::sqlite::{create_pool, run_migrations, SqliteLedger, SqliteRegistry};
use crate::config::Config;
use crate::domain::PricingConfig;
use crate::error::Result;
use crate::service::BettingService;

pub struct App {
    service: BettingService<SqliteLedger>,
    registry: SqliteRegistry,
    pricing: PricingConfig,
}

impl App {
    /// Open the database, run pending migrations, and wire the stack.
    pub fn bootstrap(config: &Config) -> Result<Self> {
        let pool = create_pool(&config.database.path)?;
        run_migrations(&pool)?;

        let ledger = SqliteLedger::new(
            pool.clone(),
            Duration::from_millis(config.database.lock_wait_ms),
        );
        let service = BettingService::new(
            ledger,
            config.pricing.clone(),
            config.settlement.draw_policy,
        );
        let registry = SqliteRegistry::new(pool);

        Ok(Self {
            service,
            registry,
            pricing: config.pricing.clone(),
        })
    }

    /// Match-scoped betting operations (placement, settlement).
    #[must_use]
    pub fn service(&self) -> &BettingService<SqliteLedger> {
        &self.service
    }

    /// Administrative writes and board queries.
    #[must_use]
    pub fn registry(&self) -> &SqliteRegistry {
        &self.registry
    }

    /// Pricing knobs, needed wherever opening quotes are published.
    #[must_use]
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }
}
