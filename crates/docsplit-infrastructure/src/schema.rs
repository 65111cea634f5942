//! SQLite schema for split storage.
//!
//! ```text
//! splits                documents                 pages
//! ┌──────────────┐      ┌──────────────────┐      ┌──────────────────────┐
//! │ id (PK)      │◄─────│ split_id (FK)    │      │ id (PK)              │
//! │ client_id    │      │ id (PK)          │◄─────│ document_id (FK,NULL)│
//! │ status       │      │ name, filename.. │      │ split_id (FK)        │
//! │ created_at   │      │ start/end_page   │      │ page_number          │
//! │ finalized_at │      └──────────────────┘      │ url                  │
//! └──────────────┘                                └──────────────────────┘
//! ```
//!
//! A page with a NULL `document_id` is in the split's unassigned pool.
//! The version lives in `PRAGMA user_version`.

use sqlx::SqlitePool;
use tracing::info;

use docsplit_core::{DomainError, Result};

/// Current schema version.
///
/// A database with a higher version was written by a newer build and is
/// refused. Version 0 means the schema has not been created yet.
pub const SCHEMA_VERSION: i64 = 1;

/// One row per split.
///
/// `finalized_at` stays NULL until the split is finalized.
const CREATE_SPLITS: &str = r#"
CREATE TABLE IF NOT EXISTS splits (
    id           TEXT PRIMARY KEY,
    client_id    TEXT NOT NULL,
    status       TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    finalized_at TEXT
)
"#;

const CREATE_SPLITS_CLIENT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS splits_client
ON splits(client_id, created_at)
"#;

/// One row per document. `start_page` / `end_page` are denormalized copies
/// of the first and last page URL.
const CREATE_DOCUMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id                TEXT PRIMARY KEY,
    split_id          TEXT NOT NULL REFERENCES splits(id),
    name              TEXT NOT NULL,
    classification    TEXT NOT NULL,
    filename          TEXT NOT NULL,
    short_description TEXT NOT NULL DEFAULT '',
    start_page        TEXT NOT NULL DEFAULT '',
    end_page          TEXT NOT NULL DEFAULT ''
)
"#;

const CREATE_DOCUMENTS_SPLIT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS documents_split
ON documents(split_id)
"#;

const CREATE_PAGES: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    id          TEXT PRIMARY KEY,
    split_id    TEXT NOT NULL REFERENCES splits(id),
    document_id TEXT REFERENCES documents(id),
    page_number INTEGER NOT NULL,
    url         TEXT NOT NULL
)
"#;

const CREATE_PAGES_SPLIT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS pages_split
ON pages(split_id, page_number)
"#;

const CREATE_PAGES_DOCUMENT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS pages_document
ON pages(document_id)
"#;

const DDL: [&str; 7] = [
    CREATE_SPLITS,
    CREATE_SPLITS_CLIENT_INDEX,
    CREATE_DOCUMENTS,
    CREATE_DOCUMENTS_SPLIT_INDEX,
    CREATE_PAGES,
    CREATE_PAGES_SPLIT_INDEX,
    CREATE_PAGES_DOCUMENT_INDEX,
];

/// Reads the stored schema version.
pub async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| DomainError::internal(format!("failed to read schema version: {}", e)))
}

/// Creates the schema on a fresh database or verifies an existing one.
pub async fn initialize(pool: &SqlitePool) -> Result<()> {
    let version = schema_version(pool).await?;

    if version > SCHEMA_VERSION {
        return Err(DomainError::internal(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DomainError::internal(format!("failed to begin schema transaction: {}", e)))?;
    for statement in DDL {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::internal(format!("failed to create schema: {}", e)))?;
    }
    // PRAGMA does not accept bound parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::internal(format!("failed to set schema version: {}", e)))?;
    tx.commit()
        .await
        .map_err(|e| DomainError::internal(format!("failed to commit schema: {}", e)))?;

    info!("[Schema] Created schema version {}", SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_sets_version() {
        let pool = memory_pool().await;
        assert_eq!(schema_version(&pool).await.unwrap(), 0);

        initialize(&pool).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["documents", "pages", "splits"]);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = memory_pool().await;
        initialize(&pool).await.unwrap();
        initialize(&pool).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_newer_version_is_rejected() {
        let pool = memory_pool().await;
        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();

        let err = initialize(&pool).await.unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("newer than supported"));
    }
}
