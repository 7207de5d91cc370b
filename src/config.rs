//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. A missing file is fine,
//! the engine runs on defaults; `TOTEBOARD_DATABASE` overrides the
//! database path either way.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::PricingConfig;
use crate::error::{ConfigError, Result};
use crate::service::DrawPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            pricing: PricingConfig::default(),
            settlement: SettlementConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the ledger lives and how long to wait for its locks.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Upper bound on waiting for a busy match lock, in milliseconds.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

fn default_database_path() -> String {
    "toteboard.db".to_string()
}

const fn default_lock_wait_ms() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

/// Settlement behavior knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettlementConfig {
    /// What to do with a completed match whose result is a draw.
    #[serde(default)]
    pub draw_policy: DrawPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    path = %path.as_ref().display(),
                    "Config file not found, running on defaults"
                );
                Self::default()
            }
            Err(err) => return Err(ConfigError::ReadFile(err).into()),
        };

        if let Ok(database) = std::env::var("TOTEBOARD_DATABASE") {
            config.database.path = database;
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path",
                reason: "must not be empty".into(),
            }
            .into());
        }
        if self.pricing.prior <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "pricing.prior",
                reason: format!("must be positive, got {}", self.pricing.prior),
            }
            .into());
        }
        if self.pricing.overround < Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "pricing.overround",
                reason: format!("must be at least 1, got {}", self.pricing.overround),
            }
            .into());
        }
        if self.pricing.min_odds < Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                field: "pricing.min_odds",
                reason: format!("must be at least 1, got {}", self.pricing.min_odds),
            }
            .into());
        }
        if self.pricing.max_odds < self.pricing.min_odds {
            return Err(ConfigError::InvalidValue {
                field: "pricing.max_odds",
                reason: format!(
                    "must not be below pricing.min_odds, got {} < {}",
                    self.pricing.max_odds, self.pricing.min_odds
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize the tracing subscriber.
    ///
    /// Logs go to stderr; stdout is reserved for command output.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}
