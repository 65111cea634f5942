//! Connection pool setup.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::time::Duration;
use tracing::info;

use docsplit_core::{DomainError, Result};

use crate::config::DatabaseConfig;
use crate::schema;
use crate::sqlite_split_repository::storage_error;

/// Opens the configured database, creating the file and schema if needed.
///
/// Connections run with foreign keys enforced and WAL journaling.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            DomainError::internal(format!(
                "failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(storage_error("failed to open database"))?;

    schema::initialize(&pool).await?;
    info!("[Database] Opened {}", config.path.display());
    Ok(pool)
}
