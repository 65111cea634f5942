//! Row types for sqlx query mapping.
//!
//! Rows convert into domain entities through the `restore` constructors, so
//! loading never re-runs mutation checks. Values that cannot be represented
//! in the domain (an unknown status, a negative page number) are reported as
//! Internal errors.

use chrono::{DateTime, Utc};

use docsplit_core::split::{Document, DocumentDraft, Page, Split, SplitParts, SplitStatus};
use docsplit_core::{DomainError, Result};

/// Row type for the `splits` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SplitRow {
    pub id: String,
    pub client_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl SplitRow {
    pub fn into_split(self, documents: Vec<Document>, unassigned_pages: Vec<Page>) -> Result<Split> {
        let status: SplitStatus = self.status.parse().map_err(|e| {
            DomainError::internal(format!("stored split {} is unreadable", self.id)).caused_by(e)
        })?;

        Ok(Split::restore(SplitParts {
            id: self.id,
            client_id: self.client_id,
            status,
            documents,
            unassigned_pages,
            created_at: self.created_at,
            updated_at: self.updated_at,
            finalized_at: self.finalized_at,
        }))
    }
}

/// Row type for the `documents` table.
///
/// `start_page` / `end_page` are not read back; the domain recomputes them
/// from the pages.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DocumentRow {
    pub id: String,
    pub split_id: String,
    pub name: String,
    pub classification: String,
    pub filename: String,
    pub short_description: String,
}

impl DocumentRow {
    pub fn into_document(self, pages: Vec<Page>) -> Document {
        let draft = DocumentDraft {
            name: self.name,
            classification: self.classification,
            filename: self.filename,
            short_description: self.short_description,
        };
        Document::restore(self.id, self.split_id, draft, pages)
    }
}

/// Row type for the `pages` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PageRow {
    pub id: String,
    pub split_id: String,
    pub document_id: Option<String>,
    pub page_number: i64,
    pub url: String,
}

impl PageRow {
    pub fn into_page(self) -> Result<Page> {
        let page_number = u32::try_from(self.page_number).map_err(|_| {
            DomainError::internal(format!(
                "stored page {} has out-of-range page number {}",
                self.id, self.page_number
            ))
        })?;
        Ok(Page::restore(
            self.id,
            self.split_id,
            self.document_id,
            page_number,
            self.url,
        ))
    }
}
