//! Unified path management for docsplit files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/docsplit/          # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/docsplit/     # Data directory
//! └── docsplit.db              # SQLite database (plus -wal / -shm)
//! ```

use std::path::PathBuf;
use thiserror::Error;

const APP_NAME: &str = "docsplit";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Platform directory could not be determined.
    #[error("Cannot find {0} directory")]
    DirNotFound(&'static str),
}

/// Resolves platform-specific locations for docsplit.
pub struct DocsplitPaths;

impl DocsplitPaths {
    /// Returns the docsplit configuration directory (e.g. `~/.config/docsplit/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Returns the docsplit data directory (e.g. `~/.local/share/docsplit/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::DirNotFound("data"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default SQLite database path.
    pub fn database_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("docsplit.db"))
    }
}
