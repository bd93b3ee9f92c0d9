//! # warden-config
//!
//! Layered configuration loading for Warden using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WARDEN_*` prefix, `__` as separator)
//! 2. Project-level `.warden/config.toml`
//! 3. User-level `~/.config/warden/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WARDEN_VALIDATION__TXN_BATCH_SIZE` -> `validation.txn_batch_size`,
//! `WARDEN_DATABASE__PATH` -> `database.path`, etc. The `__` (double
//! underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use warden_config::WardenConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = WardenConfig::load_with_dotenv().expect("config");
//!
//! let staleness = config.validation.max_staleness();
//! ```

mod error;

pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WardenConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

impl WardenConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction fails or a section is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validation.check()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when extraction fails or a section is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on
    /// top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".warden/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WARDEN_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("warden").join("config.toml"))
    }
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

fn default_db_path() -> String {
    ".warden/warden.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `":memory:"` for tests.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

const fn default_txn_batch_size() -> u32 {
    500
}

const fn default_max_staleness_secs() -> u64 {
    3600
}

const fn default_lock_lease_secs() -> u64 {
    900
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Rows fetched per snapshot transaction when draining a table.
    #[serde(default = "default_txn_batch_size")]
    pub txn_batch_size: u32,

    /// Grace window for ledger/truth mismatches near a registration or
    /// deletion event. Must cover replica propagation lag — the two are
    /// tuned together, not independently.
    #[serde(default = "default_max_staleness_secs")]
    pub max_staleness_secs: u64,

    /// Lease duration of the registry-wide run lock.
    #[serde(default = "default_lock_lease_secs")]
    pub lock_lease_secs: u64,
}

impl ValidationConfig {
    /// The staleness tolerance as a duration.
    #[must_use]
    pub fn max_staleness(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.max_staleness_secs).unwrap_or(i64::MAX))
    }

    /// The lock lease as a duration.
    #[must_use]
    pub fn lock_lease(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.lock_lease_secs).unwrap_or(i64::MAX))
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.txn_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "validation.txn_batch_size".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.lock_lease_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "validation.lock_lease_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            txn_batch_size: default_txn_batch_size(),
            max_staleness_secs: default_max_staleness_secs(),
            lock_lease_secs: default_lock_lease_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// FeedConfig
// ---------------------------------------------------------------------------

fn default_feed_root() -> String {
    ".warden/feed".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Root directory holding one subdirectory of list files per download job.
    #[serde(default = "default_feed_root")]
    pub root: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            root: default_feed_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = WardenConfig::default();
        assert_eq!(config.database.path, ".warden/warden.db");
        assert_eq!(config.validation.txn_batch_size, 500);
        assert_eq!(config.validation.max_staleness_secs, 3600);
        assert_eq!(config.validation.lock_lease_secs, 900);
        assert_eq!(config.feed.root, ".warden/feed");
    }

    #[test]
    fn max_staleness_converts_to_duration() {
        let config = ValidationConfig {
            max_staleness_secs: 120,
            ..ValidationConfig::default()
        };
        assert_eq!(config.max_staleness(), chrono::Duration::minutes(2));
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WARDEN_VALIDATION__TXN_BATCH_SIZE", "25");
            jail.set_env("WARDEN_FEED__ROOT", "/srv/feed");
            let config: WardenConfig = WardenConfig::figment().extract()?;
            assert_eq!(config.validation.txn_batch_size, 25);
            assert_eq!(config.feed.root, "/srv/feed");
            Ok(())
        });
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = ValidationConfig {
            txn_batch_size: 0,
            ..ValidationConfig::default()
        };
        assert!(config.check().is_err());
    }
}
