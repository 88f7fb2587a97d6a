//! # Cart Configuration
//!
//! Where the cart is stored and how hard the container tries to store it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_KEY=@GoMarket:products                            │
//! │     GOMARKET_DB_PATH=/data/cart.db                                     │
//! │     GOMARKET_PERSIST_RETRIES=3                                         │
//! │     GOMARKET_LOAD_TIMEOUT_MS=2000                                      │
//! │     GOMARKET_VALIDATE_ITEMS=true                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/dev.gomarket.cart/cart.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! key = "@GoMarket:products"
//! database_path = "/data/gomarket/cart.db"
//!
//! [persistence]
//! max_retries = 2
//! initial_backoff_ms = 50
//! max_backoff_ms = 1000
//!
//! [hydration]
//! timeout_ms = 2000
//!
//! [items]
//! validate = false
//! ```

use backoff::ExponentialBackoff;
use gomarket_core::validation::validate_storage_key;
use gomarket_core::DEFAULT_STORAGE_KEY;
use gomarket_db::{Database, DbConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

const CONFIG_FILE_NAME: &str = "cart.toml";
const DATABASE_FILE_NAME: &str = "cart.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the snapshot lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite file. Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// Retry policy for snapshot writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Extra attempts after a failed write. 0 surfaces the first failure.
    #[serde(default)]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound for any single retry delay (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_initial_backoff() -> u64 {
    50
}

fn default_max_backoff() -> u64 {
    1_000
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl PersistenceSettings {
    /// Builds the retry delay sequence for one write.
    pub fn backoff(&self) -> ExponentialBackoff {
        let initial = Duration::from_millis(self.initial_backoff_ms);
        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: Duration::from_millis(self.max_backoff_ms),
            multiplier: 2.0,
            max_elapsed_time: None, // bounded by max_retries instead
            ..Default::default()
        }
    }
}

// =============================================================================
// Hydration Settings
// =============================================================================

/// Settings for the initial load from storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydrationSettings {
    /// Give up on the initial read after this many milliseconds.
    /// Unset means wait as long as the store takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

// =============================================================================
// Item Settings
// =============================================================================

/// Checks applied to products handed to `add_to_cart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSettings {
    /// Reject empty ids and titles, oversized fields and bad prices.
    /// Off by default: catalog data is stored as given.
    #[serde(default)]
    pub validate: bool,
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage location.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Write retry policy.
    #[serde(default)]
    pub persistence: PersistenceSettings,

    /// Initial load behavior.
    #[serde(default)]
    pub hydration: HydrationSettings,

    /// Incoming product checks.
    #[serde(default)]
    pub items: ItemSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        validate_storage_key(&self.storage.key)
            .map_err(|e| CartError::InvalidConfig(e.to_string()))?;

        if self.persistence.initial_backoff_ms > self.persistence.max_backoff_ms {
            return Err(CartError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        if self.hydration.timeout_ms == Some(0) {
            return Err(CartError::InvalidConfig(
                "timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GOMARKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(retries) = lookup("GOMARKET_PERSIST_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.persistence.max_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid GOMARKET_PERSIST_RETRIES"),
            }
        }

        if let Some(timeout) = lookup("GOMARKET_LOAD_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.hydration.timeout_ms = Some(ms),
                Err(_) => warn!(value = %timeout, "Ignoring invalid GOMARKET_LOAD_TIMEOUT_MS"),
            }
        }

        if let Some(flag) = lookup("GOMARKET_VALIDATE_ITEMS") {
            match flag.parse::<bool>() {
                Ok(validate) => self.items.validate = validate,
                Err(_) => warn!(value = %flag, "Ignoring invalid GOMARKET_VALIDATE_ITEMS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "gomarket", "cart")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the hydration timeout, if one is configured.
    pub fn load_timeout(&self) -> Option<Duration> {
        self.hydration.timeout_ms.map(Duration::from_millis)
    }

    /// Resolves the SQLite file: configured path, then the platform data
    /// directory, then the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database_path {
            return path.clone();
        }

        directories::ProjectDirs::from("dev", "gomarket", "cart")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    /// Opens (and migrates) the SQLite database this config points at.
    pub async fn open_database(&self) -> CartResult<Database> {
        let path = self.database_path();
        info!(?path, "Opening cart database");
        Ok(Database::new(DbConfig::new(path)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();

        assert_eq!(config.storage_key(), "@GoMarket:products");
        assert_eq!(config.persistence.max_retries, 0);
        assert_eq!(config.load_timeout(), None);
        assert!(!config.items.validate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();

        config.storage.key = String::new();
        assert!(matches!(config.validate(), Err(CartError::InvalidConfig(_))));

        config.storage.key = "cart".into();
        config.persistence.initial_backoff_ms = 5_000;
        assert!(config.validate().is_err());

        config.persistence.initial_backoff_ms = 10;
        config.hydration.timeout_ms = Some(0);
        assert!(config.validate().is_err());

        config.hydration.timeout_ms = Some(250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOMARKET_STORAGE_KEY", "@Test:cart"),
            ("GOMARKET_DB_PATH", "/tmp/cart-test.db"),
            ("GOMARKET_PERSIST_RETRIES", "3"),
            ("GOMARKET_LOAD_TIMEOUT_MS", "not-a-number"),
            ("GOMARKET_VALIDATE_ITEMS", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = CartConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage_key(), "@Test:cart");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/cart-test.db"));
        assert_eq!(config.persistence.max_retries, 3);
        assert_eq!(config.load_timeout(), None);
        assert!(config.items.validate);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartConfig = toml::from_str(
            r#"
            [hydration]
            timeout_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
        assert_eq!(config.load_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.persistence, PersistenceSettings::default());
        assert_eq!(config.items, ItemSettings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.toml");

        let mut config = CartConfig::default();
        config.storage.key = "@Saved:cart".into();
        config.persistence.max_retries = 2;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[storage]"));
        assert!(contents.contains("[persistence]"));

        let loaded: CartConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_backoff_starts_at_initial_interval() {
        let settings = PersistenceSettings {
            max_retries: 1,
            initial_backoff_ms: 20,
            max_backoff_ms: 200,
        };

        let backoff = settings.backoff();
        assert_eq!(backoff.initial_interval, Duration::from_millis(20));
        assert_eq!(backoff.current_interval, Duration::from_millis(20));
        assert_eq!(backoff.max_interval, Duration::from_millis(200));
        assert_eq!(backoff.max_elapsed_time, None);
    }
}
