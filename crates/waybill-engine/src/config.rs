//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WAYBILL_DB_PATH=/var/lib/waybill/waybill.db                        │
//! │     WAYBILL_DB_MAX_CONNECTIONS=8                                       │
//! │     WAYBILL_MAX_BATCH_SIZE=1000                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/waybill/waybill.toml (Linux)                             │
//! │     ~/Library/Application Support/com.waybill.waybill/waybill.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/waybill/waybill.db"
//! max_connections = 5
//! run_migrations = true
//!
//! [catalog]
//! max_batch_size = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use waybill_core::DEFAULT_MAX_BATCH_SIZE;
use waybill_db::DbConfig;

const CONFIG_FILE: &str = "waybill.toml";
const DATABASE_FILE: &str = "waybill.db";

// =============================================================================
// Database Settings
// =============================================================================

/// Where the catalog lives and how the pool is sized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "waybill", "waybill")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Limits applied by the rate engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Largest `bulk_create` / `bulk_update` input accepted.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            max_batch_size: default_max_batch_size(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Configuration for tests and embedded use: in-memory catalog.
    pub fn in_memory() -> Self {
        EngineConfig {
            database: DatabaseSettings {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
                run_migrations: true,
            },
            catalog: CatalogSettings::default(),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.catalog.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "catalog.max_batch_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Pool configuration derived from `[database]`.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.database.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
        };

        base.run_migrations(self.database.run_migrations)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `WAYBILL_*` overrides from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("WAYBILL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("WAYBILL_DB_MAX_CONNECTIONS") {
            match value.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %value, "Ignoring invalid WAYBILL_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(value) = lookup("WAYBILL_MAX_BATCH_SIZE") {
            match value.parse::<usize>() {
                Ok(max) => {
                    debug!(max_batch_size = max, "Overriding batch size from environment");
                    self.catalog.max_batch_size = max;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid WAYBILL_MAX_BATCH_SIZE"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "waybill", "waybill")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}
