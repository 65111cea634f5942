//! Split aggregate root.
//!
//! All cross-entity rules live here: a page is owned by at most one document
//! or sits in the unassigned pool, never both, and a finalized split accepts
//! no further edits. Every mutation checks its preconditions before touching
//! any entity, so a rejected call leaves the aggregate unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::document::{Document, DocumentDraft, DocumentMetadata};
use super::page::Page;
use super::status::SplitStatus;
use crate::error::{DomainError, Result};

/// Aggregate root for one AI-generated split of a scanned bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    id: String,
    client_id: String,
    status: SplitStatus,
    documents: Vec<Document>,
    unassigned_pages: Vec<Page>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

/// Stored fields used to rebuild a [`Split`] from persistence.
#[derive(Debug, Clone)]
pub struct SplitParts {
    pub id: String,
    pub client_id: String,
    pub status: SplitStatus,
    pub documents: Vec<Document>,
    pub unassigned_pages: Vec<Page>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Split {
    /// Creates an empty draft split.
    pub fn new(id: impl Into<String>, client_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            status: SplitStatus::Draft,
            documents: Vec::new(),
            unassigned_pages: Vec::new(),
            created_at: now,
            updated_at: now,
            finalized_at: None,
        }
    }

    /// Rebuilds a split from stored parts without re-running mutation checks.
    pub fn restore(parts: SplitParts) -> Self {
        let mut split = Self {
            id: parts.id,
            client_id: parts.client_id,
            status: parts.status,
            documents: parts.documents,
            unassigned_pages: parts.unassigned_pages,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            finalized_at: parts.finalized_at,
        };
        split.sort_unassigned();
        split
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Unique split identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Client that owns this split.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn status(&self) -> SplitStatus {
        self.status
    }

    pub fn is_finalized(&self) -> bool {
        self.status == SplitStatus::Finalized
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, document_id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    pub fn unassigned_pages(&self) -> &[Page] {
        &self.unassigned_pages
    }

    /// Total number of pages reachable from the split.
    pub fn page_count(&self) -> usize {
        self.documents.iter().map(|d| d.pages().len()).sum::<usize>() + self.unassigned_pages.len()
    }

    /// Iterates over every page, assigned or not.
    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.documents
            .iter()
            .flat_map(|d| d.pages().iter())
            .chain(self.unassigned_pages.iter())
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("split ID is required"));
        }
        if self.client_id.is_empty() {
            return Err(DomainError::validation("client ID is required"));
        }
        for doc in &self.documents {
            doc.validate().map_err(|e| {
                DomainError::validation(format!("invalid document in split {}", self.id))
                    .caused_by(e)
            })?;
            if doc.split_id != self.id {
                return Err(DomainError::validation(format!(
                    "document {} belongs to split {}, not {}",
                    doc.id, doc.split_id, self.id
                )));
            }
        }
        if let Some(page) = self.unassigned_pages.iter().find(|p| p.split_id != self.id) {
            return Err(DomainError::validation(format!(
                "page {} belongs to split {}, not {}",
                page.id, page.split_id, self.id
            )));
        }
        Ok(())
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Records the time of the latest modification.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn add_document(&mut self, doc: Document) -> Result<()> {
        self.ensure_editable("add document to")?;
        doc.validate()
            .map_err(|e| DomainError::validation("invalid document").caused_by(e))?;
        if doc.split_id != self.id {
            return Err(DomainError::validation(format!(
                "document {} belongs to split {}, not {}",
                doc.id, doc.split_id, self.id
            )));
        }
        if self.document_index(&doc.id).is_some() {
            return Err(DomainError::conflict(format!(
                "document with ID {} already exists",
                doc.id
            )));
        }
        let known: HashSet<&str> = self.all_pages().map(|p| p.id.as_str()).collect();
        if doc.pages().iter().any(|p| known.contains(p.id.as_str())) {
            return Err(DomainError::conflict(
                "cannot add document with already assigned pages",
            ));
        }

        self.documents.push(doc);
        Ok(())
    }

    /// Removes a document and returns its pages to the unassigned pool.
    pub fn remove_document(&mut self, document_id: &str) -> Result<()> {
        self.ensure_editable("remove document from")?;
        let index = self.document_index(document_id).ok_or_else(|| {
            DomainError::not_found(format!(
                "document {} not found in split {}",
                document_id, self.id
            ))
        })?;

        let mut doc = self.documents.remove(index);
        self.unassigned_pages.extend(doc.take_all_pages());
        self.sort_unassigned();
        Ok(())
    }

    pub fn move_pages(
        &mut self,
        from_document_id: &str,
        to_document_id: &str,
        page_ids: &[String],
    ) -> Result<()> {
        self.ensure_editable("move pages in")?;
        let from = self
            .document_index(from_document_id)
            .ok_or_else(|| DomainError::not_found("source document not found"))?;
        let to = self
            .document_index(to_document_id)
            .ok_or_else(|| DomainError::not_found("target document not found"))?;

        let target = &self.documents[to];
        if page_ids.iter().any(|id| target.contains_page(id)) {
            return Err(DomainError::validation(
                "cannot move pages that are already assigned to target document",
            ));
        }

        // Removal is atomic on its own, and the removed pages are unassigned
        // and absent from the target, so the add below cannot reject them.
        let removed = self.documents[from].remove_pages(page_ids)?;
        self.documents[to].add_pages(removed)?;
        Ok(())
    }

    pub fn update_document_metadata(
        &mut self,
        document_id: &str,
        metadata: DocumentMetadata,
    ) -> Result<()> {
        self.ensure_editable("update document in")?;
        let index = self.document_index(document_id).ok_or_else(|| {
            DomainError::not_found(format!(
                "document {} not found in split {}",
                document_id, self.id
            ))
        })?;
        self.documents[index].update_metadata(metadata);
        Ok(())
    }

    /// Builds a new document out of pages taken from the unassigned pool.
    pub fn create_document(
        &mut self,
        document_id: impl Into<String>,
        draft: DocumentDraft,
        page_ids: &[String],
    ) -> Result<&Document> {
        self.ensure_editable("create document in")?;
        let document_id = document_id.into();
        if document_id.is_empty() {
            return Err(DomainError::validation("document ID is required"));
        }
        if self.document_index(&document_id).is_some() {
            return Err(DomainError::conflict(format!(
                "document with ID {} already exists",
                document_id
            )));
        }

        let wanted: HashSet<&str> = page_ids.iter().map(String::as_str).collect();
        let selected: Vec<Page> = self
            .unassigned_pages
            .iter()
            .filter(|p| wanted.contains(p.id.as_str()))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(DomainError::validation(
                "no valid pages specified for new document",
            ));
        }

        let doc = Document::new(document_id, self.id.clone(), draft, selected)?;
        self.unassigned_pages
            .retain(|p| !wanted.contains(p.id.as_str()));
        self.documents.push(doc);
        Ok(&self.documents[self.documents.len() - 1])
    }

    /// Moves pages from the unassigned pool into an existing document.
    pub fn assign_pages(&mut self, document_id: &str, page_ids: &[String]) -> Result<()> {
        self.ensure_editable("assign pages in")?;
        let index = self.document_index(document_id).ok_or_else(|| {
            DomainError::not_found(format!(
                "document {} not found in split {}",
                document_id, self.id
            ))
        })?;

        let wanted: HashSet<&str> = page_ids.iter().map(String::as_str).collect();
        let selected: Vec<Page> = self
            .unassigned_pages
            .iter()
            .filter(|p| wanted.contains(p.id.as_str()))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(DomainError::not_found(
                "none of the specified pages are unassigned",
            ));
        }

        self.documents[index].add_pages(selected)?;
        self.unassigned_pages
            .retain(|p| !wanted.contains(p.id.as_str()));
        Ok(())
    }

    /// Locks the split. Irreversible; a second call fails with Conflict.
    pub fn finalize(&mut self, finalized_at: DateTime<Utc>) -> Result<()> {
        if self.is_finalized() {
            return Err(DomainError::conflict("split already finalized"));
        }
        if !self.unassigned_pages.is_empty() {
            return Err(DomainError::validation(format!(
                "cannot finalize split with unassigned pages ({} remaining)",
                self.unassigned_pages.len()
            )));
        }
        self.validate()
            .map_err(|e| DomainError::validation("invalid split").caused_by(e))?;

        self.status = SplitStatus::Finalized;
        self.finalized_at = Some(finalized_at);
        self.updated_at = finalized_at;
        Ok(())
    }

    fn ensure_editable(&self, action: &str) -> Result<()> {
        if self.is_finalized() {
            return Err(DomainError::conflict(format!(
                "cannot {} finalized split {}",
                action, self.id
            )));
        }
        Ok(())
    }

    fn document_index(&self, document_id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == document_id)
    }

    fn sort_unassigned(&mut self) {
        self.unassigned_pages
            .sort_by(|a, b| a.page_number.cmp(&b.page_number).then_with(|| a.id.cmp(&b.id)));
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Split {} ({}): {} documents, {} unassigned pages, status: {}",
            self.id,
            self.client_id,
            self.documents.len(),
            self.unassigned_pages.len(),
            self.status
        )
    }
}
