//! SQLite-backed SplitRepository implementation.
//!
//! The repository does not own a connection. It shares the transaction of the
//! unit of work that created it, so every statement it runs commits or rolls
//! back together with the rest of that unit.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

use docsplit_core::split::{Document, Page, Split, SplitRepository};
use docsplit_core::{DomainError, Result};

use crate::reconcile::ReconcilePlan;
use crate::rows::{DocumentRow, PageRow, SplitRow};
use crate::sqlite_unit_of_work::SharedTransaction;

/// Maps a sqlx failure to an Internal error with context.
pub(crate) fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::internal(format!("{}: {}", context, e))
}

fn closed_transaction() -> DomainError {
    DomainError::internal("transaction already closed")
}

/// Split repository bound to one open transaction.
pub struct SqliteSplitRepository {
    tx: SharedTransaction,
}

impl SqliteSplitRepository {
    pub(crate) fn new(tx: SharedTransaction) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SplitRepository for SqliteSplitRepository {
    async fn get(&self, split_id: &str) -> Result<Option<Split>> {
        let mut guard = self.tx.lock().await;
        let conn: &mut SqliteConnection = guard.as_mut().ok_or_else(closed_transaction)?;
        load_split(conn, split_id).await
    }

    async fn save(&self, split: &Split) -> Result<()> {
        let mut guard = self.tx.lock().await;
        let conn: &mut SqliteConnection = guard.as_mut().ok_or_else(closed_transaction)?;

        check_ownership(split)?;
        let stored_documents = stored_document_ids(conn, split.id()).await?;
        let stored_pages = stored_page_ids(conn, split.id()).await?;

        upsert_split(conn, split).await?;
        for doc in split.documents() {
            upsert_document(conn, doc).await?;
        }
        for page in split.all_pages() {
            upsert_page(conn, page).await?;
        }

        let plan = ReconcilePlan::for_split(split, &stored_documents, &stored_pages);
        for page_id in &plan.stale_page_ids {
            sqlx::query("DELETE FROM pages WHERE id = ?")
                .bind(page_id)
                .execute(&mut *conn)
                .await
                .map_err(storage_error("failed to delete stale page"))?;
        }
        for document_id in &plan.stale_document_ids {
            sqlx::query("DELETE FROM documents WHERE id = ?")
                .bind(document_id)
                .execute(&mut *conn)
                .await
                .map_err(storage_error("failed to delete stale document"))?;
        }

        debug!(
            "[SqliteSplitRepository] Saved split {}: {} documents, {} pages, {} stale documents, {} stale pages",
            split.id(),
            split.documents().len(),
            split.page_count(),
            plan.stale_document_ids.len(),
            plan.stale_page_ids.len()
        );
        Ok(())
    }

    async fn delete(&self, split_id: &str) -> Result<()> {
        let mut guard = self.tx.lock().await;
        let conn: &mut SqliteConnection = guard.as_mut().ok_or_else(closed_transaction)?;

        let pages = sqlx::query("DELETE FROM pages WHERE split_id = ?")
            .bind(split_id)
            .execute(&mut *conn)
            .await
            .map_err(storage_error("failed to delete pages"))?;
        let documents = sqlx::query("DELETE FROM documents WHERE split_id = ?")
            .bind(split_id)
            .execute(&mut *conn)
            .await
            .map_err(storage_error("failed to delete documents"))?;
        sqlx::query("DELETE FROM splits WHERE id = ?")
            .bind(split_id)
            .execute(&mut *conn)
            .await
            .map_err(storage_error("failed to delete split"))?;

        debug!(
            "[SqliteSplitRepository] Deleted split {} ({} documents, {} pages)",
            split_id,
            documents.rows_affected(),
            pages.rows_affected()
        );
        Ok(())
    }

    async fn list_by_client_id(&self, client_id: &str) -> Result<Vec<Split>> {
        let mut guard = self.tx.lock().await;
        let conn: &mut SqliteConnection = guard.as_mut().ok_or_else(closed_transaction)?;

        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM splits WHERE client_id = ? ORDER BY created_at DESC, id",
        )
        .bind(client_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(storage_error("failed to list splits"))?;

        let mut splits = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(split) = load_split(conn, &id).await? {
                splits.push(split);
            }
        }
        Ok(splits)
    }

    async fn get_split_id_by_document_id(&self, document_id: &str) -> Result<String> {
        let mut guard = self.tx.lock().await;
        let conn: &mut SqliteConnection = guard.as_mut().ok_or_else(closed_transaction)?;

        sqlx::query_scalar::<_, String>("SELECT split_id FROM documents WHERE id = ?")
            .bind(document_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(storage_error("failed to look up document"))?
            .ok_or_else(|| DomainError::not_found(format!("document {} not found", document_id)))
    }
}

// ============================================================================
// Load
// ============================================================================

async fn load_split(conn: &mut SqliteConnection, split_id: &str) -> Result<Option<Split>> {
    let Some(split_row) = sqlx::query_as::<_, SplitRow>(
        "SELECT id, client_id, status, created_at, updated_at, finalized_at \
         FROM splits WHERE id = ?",
    )
    .bind(split_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error("failed to load split"))?
    else {
        return Ok(None);
    };

    let document_rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT d.id, d.split_id, d.name, d.classification, d.filename, d.short_description \
         FROM documents d WHERE d.split_id = ? \
         ORDER BY (SELECT MIN(p.page_number) FROM pages p WHERE p.document_id = d.id), d.id",
    )
    .bind(split_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_error("failed to load documents"))?;

    let page_rows = sqlx::query_as::<_, PageRow>(
        "SELECT id, split_id, document_id, page_number, url \
         FROM pages WHERE split_id = ? ORDER BY page_number, id",
    )
    .bind(split_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_error("failed to load pages"))?;

    let mut unassigned = Vec::new();
    let mut by_document: HashMap<String, Vec<Page>> = HashMap::new();
    for row in page_rows {
        let page = row.into_page()?;
        match page.document_id() {
            Some(document_id) => by_document
                .entry(document_id.to_string())
                .or_default()
                .push(page),
            None => unassigned.push(page),
        }
    }

    let documents: Vec<Document> = document_rows
        .into_iter()
        .map(|row| {
            let pages = by_document.remove(&row.id).unwrap_or_default();
            row.into_document(pages)
        })
        .collect();

    if let Some(orphan) = by_document.keys().next() {
        return Err(DomainError::internal(format!(
            "stored pages of split {} reference unknown document {}",
            split_id, orphan
        )));
    }

    split_row.into_split(documents, unassigned).map(Some)
}

async fn stored_document_ids(conn: &mut SqliteConnection, split_id: &str) -> Result<Vec<String>> {
    sqlx::query_scalar("SELECT id FROM documents WHERE split_id = ? ORDER BY id")
        .bind(split_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(storage_error("failed to read stored documents"))
}

async fn stored_page_ids(conn: &mut SqliteConnection, split_id: &str) -> Result<Vec<String>> {
    sqlx::query_scalar("SELECT id FROM pages WHERE split_id = ? ORDER BY id")
        .bind(split_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(storage_error("failed to read stored pages"))
}

// ============================================================================
// Save
// ============================================================================

/// Rejects a split whose documents or pages name a different split.
fn check_ownership(split: &Split) -> Result<()> {
    if let Some(doc) = split.documents().iter().find(|d| d.split_id != split.id()) {
        return Err(DomainError::validation(format!(
            "cannot save split {}: document {} belongs to split {}",
            split.id(),
            doc.id,
            doc.split_id
        )));
    }
    if let Some(page) = split.all_pages().find(|p| p.split_id != split.id()) {
        return Err(DomainError::validation(format!(
            "cannot save split {}: page {} belongs to split {}",
            split.id(),
            page.id,
            page.split_id
        )));
    }
    Ok(())
}

async fn upsert_split(conn: &mut SqliteConnection, split: &Split) -> Result<()> {
    sqlx::query(
        "INSERT INTO splits (id, client_id, status, created_at, updated_at, finalized_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
             client_id = excluded.client_id, \
             status = excluded.status, \
             created_at = excluded.created_at, \
             updated_at = excluded.updated_at, \
             finalized_at = excluded.finalized_at",
    )
    .bind(split.id())
    .bind(split.client_id())
    .bind(split.status().as_str())
    .bind(split.created_at)
    .bind(split.updated_at)
    .bind(split.finalized_at())
    .execute(&mut *conn)
    .await
    .map_err(storage_error("failed to save split"))?;
    Ok(())
}

async fn upsert_document(conn: &mut SqliteConnection, doc: &Document) -> Result<()> {
    // The WHERE clause turns a takeover of another split's document into a
    // no-op, detected through rows_affected.
    let result = sqlx::query(
        "INSERT INTO documents \
             (id, split_id, name, classification, filename, short_description, start_page, end_page) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, \
             classification = excluded.classification, \
             filename = excluded.filename, \
             short_description = excluded.short_description, \
             start_page = excluded.start_page, \
             end_page = excluded.end_page \
         WHERE documents.split_id = excluded.split_id",
    )
    .bind(&doc.id)
    .bind(&doc.split_id)
    .bind(&doc.name)
    .bind(&doc.classification)
    .bind(&doc.filename)
    .bind(&doc.short_description)
    .bind(doc.start_page())
    .bind(doc.end_page())
    .execute(&mut *conn)
    .await
    .map_err(storage_error("failed to save document"))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::conflict(format!(
            "document {} belongs to another split",
            doc.id
        )));
    }
    Ok(())
}

async fn upsert_page(conn: &mut SqliteConnection, page: &Page) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO pages (id, split_id, document_id, page_number, url) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
             document_id = excluded.document_id, \
             page_number = excluded.page_number, \
             url = excluded.url \
         WHERE pages.split_id = excluded.split_id",
    )
    .bind(&page.id)
    .bind(&page.split_id)
    .bind(page.document_id())
    .bind(i64::from(page.page_number))
    .bind(&page.url)
    .execute(&mut *conn)
    .await
    .map_err(storage_error("failed to save page"))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::conflict(format!(
            "page {} belongs to another split",
            page.id
        )));
    }
    Ok(())
}
