//! Split repository trait.
//!
//! Defines the persistence contract for the split aggregate. A repository is
//! always obtained from a [`UnitOfWork`](crate::uow::UnitOfWork) and every
//! call runs inside that unit's transaction.

use async_trait::async_trait;

use super::aggregate::Split;
use crate::error::Result;

/// Persists and loads whole [`Split`] aggregates.
///
/// # Implementation Notes
///
/// - `save` writes the aggregate as a unit. Documents and pages that are no
///   longer part of the aggregate are deleted from storage.
/// - `get` returns the aggregate exactly as it was last saved, including
///   status, timestamps and which pages are unassigned.
#[async_trait]
pub trait SplitRepository: Send + Sync {
    /// Loads a split by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Split))`: Split found
    /// - `Ok(None)`: No split with that ID
    /// - `Err(_)`: Storage failure or an unreadable stored row
    async fn get(&self, split_id: &str) -> Result<Option<Split>>;

    /// Inserts or replaces the stored state of a split.
    ///
    /// Fails with Conflict when a document or page ID in the aggregate is
    /// already stored under a different split.
    async fn save(&self, split: &Split) -> Result<()>;

    /// Deletes a split with all of its documents and pages.
    ///
    /// Deleting a split that does not exist is not an error.
    async fn delete(&self, split_id: &str) -> Result<()>;

    /// Lists all splits of a client, newest first.
    async fn list_by_client_id(&self, client_id: &str) -> Result<Vec<Split>>;

    /// Resolves the split that contains a document.
    ///
    /// Fails with NotFound when no stored document has that ID.
    async fn get_split_id_by_document_id(&self, document_id: &str) -> Result<String>;
}
