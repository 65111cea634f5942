//! Application configuration.
//!
//! Loaded from `config.toml`:
//!
//! ```toml
//! [database]
//! path = "/var/lib/docsplit/docsplit.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//! ```
//!
//! Every key is optional. A missing or empty file yields the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::DocsplitPaths;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not determine configuration directory")]
    ConfigDirNotFound,
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

/// SQLite connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, created on first use.
    pub path: PathBuf,
    pub max_connections: u32,
    /// How long a statement waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DocsplitPaths::database_file().unwrap_or_else(|_| PathBuf::from("docsplit.db")),
            max_connections: 5,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    /// Settings for a database file at `path`, defaults otherwise.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the default location.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = DocsplitPaths::config_file().map_err(|_| ConfigError::ConfigDirNotFound)?;
        Self::load(&path)
    }

    /// Loads the configuration from `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(AppConfig)`: Parsed configuration, or defaults if the file is missing or empty
    /// - `Err(ConfigError::Io)`: The file exists but could not be read
    /// - `Err(ConfigError::Parse)`: The file is not valid TOML for `AppConfig`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
