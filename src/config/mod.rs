//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file, then environment
//! overrides:
//!
//! | Variable | Overrides |
//! |---|---|
//! | `SHOPFRONT_CONFIG` | path of the YAML file |
//! | `SHOPFRONT_BIND` | `server.bind` |
//! | `SHOPFRONT_DATABASE_URL` | `storage.database_url` |
//! | `SHOPFRONT_LINE_ITEM_MODE` | `orders.line_item_mode` |

use crate::core::line_item::LineItemMode;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_PATH_VAR: &str = "SHOPFRONT_CONFIG";
pub const BIND_VAR: &str = "SHOPFRONT_BIND";
pub const DATABASE_URL_VAR: &str = "SHOPFRONT_DATABASE_URL";
pub const LINE_ITEM_MODE_VAR: &str = "SHOPFRONT_LINE_ITEM_MODE";

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub orders: OrdersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Required for the postgres backend
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// How adding an already-present product to an order is recorded
    pub line_item_mode: LineItemMode,
}

impl ShopConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Invalid YAML configuration")?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// `lookup` resolves a variable name; pass `|key| std::env::var(key).ok()`
    /// for the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_VAR) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(DATABASE_URL_VAR) {
            self.storage.database_url = Some(url);
            // A database URL on its own selects the database backend.
            self.storage.backend = StorageBackend::Postgres;
        }
        if let Some(mode) = lookup(LINE_ITEM_MODE_VAR) {
            self.orders.line_item_mode = mode
                .parse()
                .map_err(|e| anyhow::anyhow!("{}: {}", LINE_ITEM_MODE_VAR, e))?;
        }
        Ok(())
    }

    /// Read `SHOPFRONT_CONFIG` (if set), apply the environment, validate.
    pub fn load() -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let mut config = match env(CONFIG_PATH_VAR) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::Postgres
            && self.storage.database_url.as_deref().is_none_or(str::is_empty)
        {
            bail!("storage.database_url is required when storage.backend is postgres");
        }
        if self.storage.max_connections == 0 {
            bail!("storage.max_connections must be at least 1");
        }
        Ok(())
    }
}
