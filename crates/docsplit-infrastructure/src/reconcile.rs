//! Planning of row deletions when a split is saved.
//!
//! Saving upserts every document and page the aggregate holds. Whatever is
//! still stored for the split but no longer in the aggregate is stale and
//! must be deleted afterwards, pages first.

use std::collections::HashSet;

use docsplit_core::split::Split;

/// Stored rows that a save has to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub stale_document_ids: Vec<String>,
    pub stale_page_ids: Vec<String>,
}

impl ReconcilePlan {
    /// Computes the stored IDs that are absent from `split`.
    ///
    /// Output keeps the order of the stored ID lists.
    pub fn for_split(
        split: &Split,
        stored_document_ids: &[String],
        stored_page_ids: &[String],
    ) -> Self {
        let live_documents: HashSet<&str> =
            split.documents().iter().map(|d| d.id.as_str()).collect();
        let live_pages: HashSet<&str> = split.all_pages().map(|p| p.id.as_str()).collect();

        Self {
            stale_document_ids: stored_document_ids
                .iter()
                .filter(|id| !live_documents.contains(id.as_str()))
                .cloned()
                .collect(),
            stale_page_ids: stored_page_ids
                .iter()
                .filter(|id| !live_pages.contains(id.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stale_document_ids.is_empty() && self.stale_page_ids.is_empty()
    }
}
