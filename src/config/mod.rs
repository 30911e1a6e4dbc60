//! Configuration
//!
//! Typed settings loaded by [`ConfigLoader`]: built-in defaults, then the
//! global `config.toml`, then an explicit `--config` file, then
//! `LINKSHELF__SECTION__KEY` environment variables.

pub mod loader;
pub mod xdg;

pub use loader::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::TreeLimits;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub tree: TreeLimits,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShelfConfig {
    /// Directory of the sled database, configured or XDG default
    pub fn store_path(&self) -> Result<PathBuf, ApiError> {
        match &self.storage.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => xdg::default_store_path(),
        }
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory; unset means `$XDG_DATA_HOME/linkshelf/store`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Seconds between background cursor saves; 0 disables them
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,
}

fn default_autosave_secs() -> u64 {
    30
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            autosave_secs: default_autosave_secs(),
        }
    }
}

impl NavigationConfig {
    pub fn autosave_interval(&self) -> Option<Duration> {
        (self.autosave_secs > 0).then(|| Duration::from_secs(self.autosave_secs))
    }
}

/// Title and favicon lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on one network lookup
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Quiet period before a title lookup starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_user_agent() -> String {
    format!("linkshelf/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_ms: default_timeout_ms(),
            debounce_ms: default_debounce_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
