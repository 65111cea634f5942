//! Document entity.
//!
//! A document owns an ordered set of pages. Pages are kept sorted by page
//! number and `start_page` / `end_page` always mirror the URLs of the first and
//! last page.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::page::Page;
use crate::error::{DomainError, Result};

/// Descriptive fields supplied when a document is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    /// Display name, e.g. "John's W-2".
    pub name: String,
    /// Free-text classification, e.g. "W-2" or "Invoice".
    pub classification: String,
    /// File name used when the document is downloaded.
    pub filename: String,
    /// Human-friendly summary.
    #[serde(default)]
    pub short_description: String,
}

impl DocumentDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation("document name is required"));
        }
        if self.classification.is_empty() {
            return Err(DomainError::validation(
                "document classification is required",
            ));
        }
        if self.filename.is_empty() {
            return Err(DomainError::validation("document filename is required"));
        }
        Ok(())
    }
}

/// Optional fields applied by [`Document::update_metadata`].
///
/// `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

/// One contiguous logical sub-document of a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: String,
    pub split_id: String,
    pub name: String,
    pub classification: String,
    pub filename: String,
    pub short_description: String,
    pages: Vec<Page>,
    start_page: String,
    end_page: String,
}

impl Document {
    /// Creates a document that takes ownership of `pages`.
    ///
    /// Every page must be unassigned; each one is assigned to the new document.
    pub fn new(
        id: impl Into<String>,
        split_id: impl Into<String>,
        draft: DocumentDraft,
        pages: Vec<Page>,
    ) -> Result<Self> {
        let mut doc = Self {
            id: id.into(),
            split_id: split_id.into(),
            name: draft.name,
            classification: draft.classification,
            filename: draft.filename,
            short_description: draft.short_description,
            pages: Vec::with_capacity(pages.len()),
            start_page: String::new(),
            end_page: String::new(),
        };

        doc.add_pages(pages)
            .map_err(|e| DomainError::validation("invalid document").caused_by(e))?;
        doc.validate()
            .map_err(|e| DomainError::validation("invalid document").caused_by(e))?;
        Ok(doc)
    }

    /// Rebuilds a document from stored fields. Pages are taken as-is.
    pub fn restore(
        id: impl Into<String>,
        split_id: impl Into<String>,
        draft: DocumentDraft,
        pages: Vec<Page>,
    ) -> Self {
        let mut doc = Self {
            id: id.into(),
            split_id: split_id.into(),
            name: draft.name,
            classification: draft.classification,
            filename: draft.filename,
            short_description: draft.short_description,
            pages,
            start_page: String::new(),
            end_page: String::new(),
        };
        doc.update_page_range();
        doc
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn start_page(&self) -> &str {
        &self.start_page
    }

    pub fn end_page(&self) -> &str {
        &self.end_page
    }

    pub fn contains_page(&self, page_id: &str) -> bool {
        self.pages.iter().any(|p| p.id == page_id)
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.id.clone()).collect()
    }

    /// Checks that every page in `pages` could be added to this document.
    pub fn check_pages(&self, pages: &[Page]) -> Result<()> {
        let mut seen: HashSet<&str> = self.pages.iter().map(|p| p.id.as_str()).collect();
        for page in pages {
            if page.split_id != self.split_id {
                return Err(DomainError::validation(format!(
                    "page {} belongs to split {}, not {}",
                    page.id, page.split_id, self.split_id
                )));
            }
            if page.is_assigned() {
                let cause = DomainError::conflict(format!(
                    "page {} is already assigned to a document",
                    page.id
                ));
                return Err(
                    DomainError::validation("failed to assign page to document").caused_by(cause)
                );
            }
            if !seen.insert(page.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "page {} is already in document {}",
                    page.id, self.id
                )));
            }
        }
        Ok(())
    }

    /// Adds pages to the document.
    ///
    /// The whole batch is checked before any page is touched, so a failure
    /// leaves both the document and the rejected pages unchanged.
    pub fn add_pages(&mut self, pages: Vec<Page>) -> Result<()> {
        self.check_pages(&pages)?;
        for mut page in pages {
            page.assign_to_document(&self.id)?;
            self.pages.push(page);
        }
        self.update_page_range();
        Ok(())
    }

    /// Removes the given pages and returns them unassigned.
    ///
    /// An empty request is a no-op. Fails with NotFound when none of the IDs
    /// belong to this document.
    pub fn remove_pages(&mut self, page_ids: &[String]) -> Result<Vec<Page>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: HashSet<&str> = page_ids.iter().map(String::as_str).collect();

        let (mut removed, remaining): (Vec<Page>, Vec<Page>) = std::mem::take(&mut self.pages)
            .into_iter()
            .partition(|p| wanted.contains(p.id.as_str()));
        self.pages = remaining;

        if removed.is_empty() {
            return Err(DomainError::not_found(format!(
                "none of the specified pages found in document {}",
                self.id
            )));
        }
        for page in &mut removed {
            page.unassign();
        }
        self.update_page_range();
        Ok(removed)
    }

    /// Removes every page, leaving the document empty.
    pub(crate) fn take_all_pages(&mut self) -> Vec<Page> {
        let mut pages = std::mem::take(&mut self.pages);
        for page in &mut pages {
            page.unassign();
        }
        self.update_page_range();
        pages
    }

    pub fn update_metadata(&mut self, metadata: DocumentMetadata) {
        if let Some(name) = metadata.name {
            self.name = name;
        }
        if let Some(classification) = metadata.classification {
            self.classification = classification;
        }
        if let Some(short_description) = metadata.short_description {
            self.short_description = short_description;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("document ID is required"));
        }
        if self.split_id.is_empty() {
            return Err(DomainError::validation("split ID is required"));
        }
        if self.name.is_empty() {
            return Err(DomainError::validation("document name is required"));
        }
        if self.classification.is_empty() {
            return Err(DomainError::validation(
                "document classification is required",
            ));
        }
        if self.filename.is_empty() {
            return Err(DomainError::validation("document filename is required"));
        }
        if self.pages.is_empty() {
            return Err(DomainError::validation(
                "document must have at least one page",
            ));
        }
        for page in &self.pages {
            page.validate()
                .map_err(|e| DomainError::validation("invalid page in document").caused_by(e))?;
            if page.split_id != self.split_id {
                return Err(DomainError::validation(format!(
                    "page {} belongs to split {}, not {}",
                    page.id, page.split_id, self.split_id
                )));
            }
            if page.document_id() != Some(self.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "page {} is not owned by document {}",
                    page.id, self.id
                )));
            }
        }
        Ok(())
    }

    fn update_page_range(&mut self) {
        self.pages
            .sort_by(|a, b| a.page_number.cmp(&b.page_number).then_with(|| a.id.cmp(&b.id)));

        match (self.pages.first(), self.pages.last()) {
            (Some(first), Some(last)) => {
                self.start_page = first.url.clone();
                self.end_page = last.url.clone();
            }
            _ => {
                self.start_page.clear();
                self.end_page.clear();
            }
        }
    }
}
