//! # Store Configuration
//!
//! Settings for the database pool and order queries.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOOKSTORE_DB_PATH=/var/lib/bookstore/bookstore.db                  │
//! │     BOOKSTORE_DB_MAX_CONNECTIONS=8                                     │
//! │     BOOKSTORE_DEFAULT_PAGE_SIZE=20                                     │
//! │     BOOKSTORE_MAX_PAGE_SIZE=100                                        │
//! │                                                                         │
//! │  2. TOML Config File (optional, path given by the caller)              │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "./bookstore.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [orders]
//! default_page_size = 20
//! max_page_size = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use bookstore_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::pool::DbConfig;
use crate::service::OrderService;

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: PathBuf::from("./bookstore.db"),
            max_connections: 5,
            busy_timeout_ms: 5_000,
        }
    }
}

/// `[orders]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for OrderSettings {
    fn default() -> Self {
        OrderSettings {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub orders: OrderSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file, if a path is given and the file exists
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `BOOKSTORE_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("BOOKSTORE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("BOOKSTORE_DB_MAX_CONNECTIONS") {
            match value.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %value, "Ignoring invalid BOOKSTORE_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(value) = lookup("BOOKSTORE_DEFAULT_PAGE_SIZE") {
            match value.parse::<u32>() {
                Ok(size) => self.orders.default_page_size = size,
                Err(_) => warn!(value = %value, "Ignoring invalid BOOKSTORE_DEFAULT_PAGE_SIZE"),
            }
        }

        if let Some(value) = lookup("BOOKSTORE_MAX_PAGE_SIZE") {
            match value.parse::<u32>() {
                Ok(size) => self.orders.max_page_size = size,
                Err(_) => warn!(value = %value, "Ignoring invalid BOOKSTORE_MAX_PAGE_SIZE"),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.orders.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "orders.max_page_size must be greater than 0".into(),
            ));
        }

        if self.orders.default_page_size == 0
            || self.orders.default_page_size > self.orders.max_page_size
        {
            return Err(ConfigError::Invalid(format!(
                "orders.default_page_size must be between 1 and {}",
                self.orders.max_page_size
            )));
        }

        Ok(())
    }

    /// Pool settings derived from the `[database]` section.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    /// Applies the `[orders]` page limits to a service.
    pub fn configure_service(&self, service: OrderService) -> OrderService {
        service.with_page_limits(self.orders.default_page_size, self.orders.max_page_size)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.database.path, PathBuf::from("./bookstore.db"));
        assert_eq!(config.orders.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.orders.max_page_size, MAX_PAGE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/shop.db"

            [orders]
            max_page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.orders.max_page_size, 50);
        assert_eq!(config.orders.default_page_size, DEFAULT_PAGE_SIZE);

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(db.busy_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_invalid_toml() {
        let result = StoreConfig::from_toml_str("[database\npath = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("BOOKSTORE_DB_PATH", "/data/books.db"),
            ("BOOKSTORE_DB_MAX_CONNECTIONS", "8"),
            ("BOOKSTORE_DEFAULT_PAGE_SIZE", "oops"),
            ("BOOKSTORE_MAX_PAGE_SIZE", "40"),
        ]);

        let mut config = StoreConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/data/books.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.orders.default_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.orders.max_page_size, 40);
    }

    #[test]
    fn test_validate_page_sizes() {
        let mut config = StoreConfig::default();
        config.orders.default_page_size = 200;
        config.orders.max_page_size = 100;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.orders.default_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("bookstore-config-that-does-not-exist.toml");
        let config = StoreConfig::load(Some(&path)).unwrap();
        assert!(config.validate().is_ok());
    }
}
