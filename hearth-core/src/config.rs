//! Application configuration management.
//!
//! Handles loading, saving, and accessing application configuration: which
//! entity store backend to use, logging, the event bus, and household
//! defaults. Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENT_BUS_CAPACITY, DEFAULT_MAX_BLOB_BYTES};
use crate::error::{HearthError, HearthResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Entity store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event bus settings.
    #[serde(default)]
    pub events: EventConfig,

    /// Defaults applied to newly created households.
    #[serde(default)]
    pub household: HouseholdConfig,
}

/// Which entity store adapter backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SQLite document tables on local disk.
    Sqlite,
    /// Process-local maps; nothing survives a restart.
    Memory,
}

/// Entity store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Path to the SQLite database file. If empty, uses default location.
    #[serde(default)]
    pub path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Run integrity check on startup.
    #[serde(default = "default_true")]
    pub integrity_check_on_startup: bool,

    /// Largest blob accepted by `upload_blob`, in bytes.
    #[serde(default = "default_max_blob_bytes")]
    pub max_blob_bytes: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// Event bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Broadcast channel capacity. Slow subscribers lag past this.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

/// Household defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdConfig {
    /// Unit system for new families: "imperial" or "metric".
    #[serde(default = "default_units")]
    pub default_units: String,

    /// Weather location for new families (free-form, e.g. a city name).
    #[serde(default)]
    pub weather_location: String,
}

// Default value functions for serde

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    4
}

fn default_max_blob_bytes() -> u64 {
    DEFAULT_MAX_BLOB_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bus_capacity() -> usize {
    DEFAULT_EVENT_BUS_CAPACITY
}

fn default_units() -> String {
    "imperial".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
            integrity_check_on_startup: true,
            max_blob_bytes: default_max_blob_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
        }
    }
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            default_units: default_units(),
            weather_location: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> HearthResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> HearthResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> HearthResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| HearthError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> HearthResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective database path, using the configured path or the default.
    pub fn effective_db_path(&self) -> HearthResult<PathBuf> {
        if self.store.path.is_empty() {
            Ok(Platform::data_dir()?.join("hearth.db"))
        } else {
            Ok(PathBuf::from(&self.store.path))
        }
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> HearthResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Reject values that would make the store or event bus unusable.
    pub fn validate(&self) -> HearthResult<()> {
        if self.store.pool_size == 0 {
            return Err(HearthError::Config("store.pool_size must be at least 1".into()));
        }
        if self.events.bus_capacity == 0 {
            return Err(HearthError::Config("events.bus_capacity must be at least 1".into()));
        }
        match self.household.default_units.as_str() {
            "imperial" | "metric" => Ok(()),
            other => Err(HearthError::Config(format!(
                "household.default_units must be imperial or metric, got `{other}`"
            ))),
        }
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }
}
