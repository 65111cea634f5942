//! Split use cases.
//!
//! Every public method opens exactly one unit of work. The unit is committed
//! when the use case succeeds and rolled back when any step fails, so a
//! rejected aggregate operation never reaches storage.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use docsplit_core::render::{RenderService, RenderedDocument};
use docsplit_core::split::{Document, DocumentDraft, DocumentMetadata, Split, SplitRepository};
use docsplit_core::uow::{UnitOfWork, UnitOfWorkFactory};
use docsplit_core::{DomainError, Result};

/// The two documents touched by [`SplitService::move_pages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedPages {
    pub from_document: Document,
    pub to_document: Document,
}

/// Coordinates split use cases over a unit of work factory.
pub struct SplitService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    render_service: Arc<dyn RenderService>,
}

impl SplitService {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        render_service: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            uow_factory,
            render_service,
        }
    }

    /// Creates a split from the splitting model's JSON output and stores it.
    ///
    /// # Errors
    ///
    /// - Validation: the JSON is malformed or describes an invalid split
    /// - Conflict: a split with the same ID is already stored
    pub async fn ingest_split(&self, json: &str) -> Result<Split> {
        let split = Split::from_json(json)?;
        info!(
            "[SplitService] Ingesting split {} for client {} ({} documents)",
            split.id(),
            split.client_id(),
            split.documents().len()
        );

        let uow = self.uow_factory.begin().await?;
        let result = store_new(uow.split_repository(), &split).await;
        finish(uow.as_ref(), result).await?;
        Ok(split)
    }

    pub async fn load_split(&self, split_id: &str) -> Result<Split> {
        let uow = self.uow_factory.begin().await?;
        let result = load_required(uow.split_repository(), split_id).await;
        finish(uow.as_ref(), result).await
    }

    /// Lists a client's splits, newest first.
    pub async fn list_splits(&self, client_id: &str) -> Result<Vec<Split>> {
        let uow = self.uow_factory.begin().await?;
        let result = uow.split_repository().list_by_client_id(client_id).await;
        finish(uow.as_ref(), result).await
    }

    pub async fn update_document_metadata(
        &self,
        document_id: &str,
        metadata: DocumentMetadata,
    ) -> Result<Document> {
        let uow = self.uow_factory.begin().await?;
        let result = update_metadata_in(uow.split_repository(), document_id, metadata).await;
        finish(uow.as_ref(), result).await
    }

    pub async fn move_pages(
        &self,
        split_id: &str,
        from_document_id: &str,
        to_document_id: &str,
        page_ids: &[String],
    ) -> Result<MovedPages> {
        let uow = self.uow_factory.begin().await?;
        let result = move_pages_in(
            uow.split_repository(),
            split_id,
            from_document_id,
            to_document_id,
            page_ids,
        )
        .await;
        finish(uow.as_ref(), result).await
    }

    /// Builds a new document from unassigned pages. The document ID is generated.
    pub async fn create_document(
        &self,
        split_id: &str,
        draft: DocumentDraft,
        page_ids: &[String],
    ) -> Result<Document> {
        let uow = self.uow_factory.begin().await?;
        let result = create_document_in(uow.split_repository(), split_id, draft, page_ids).await;
        let document = finish(uow.as_ref(), result).await?;
        info!(
            "[SplitService] Created document {} in split {} ({} pages)",
            document.id,
            split_id,
            document.pages().len()
        );
        Ok(document)
    }

    /// Assigns unassigned pages to an existing document.
    pub async fn assign_pages(
        &self,
        split_id: &str,
        document_id: &str,
        page_ids: &[String],
    ) -> Result<Document> {
        let uow = self.uow_factory.begin().await?;
        let result = assign_pages_in(uow.split_repository(), split_id, document_id, page_ids).await;
        finish(uow.as_ref(), result).await
    }

    /// Removes a document; its pages return to the unassigned pool.
    pub async fn delete_document(&self, document_id: &str) -> Result<Split> {
        let uow = self.uow_factory.begin().await?;
        let result = delete_document_in(uow.split_repository(), document_id).await;
        let split = finish(uow.as_ref(), result).await?;
        info!(
            "[SplitService] Deleted document {} from split {}",
            document_id, split.id()
        );
        Ok(split)
    }

    pub async fn finalize_split(&self, split_id: &str) -> Result<Split> {
        let uow = self.uow_factory.begin().await?;
        let result = finalize_in(uow.split_repository(), split_id).await;
        let split = finish(uow.as_ref(), result).await?;
        info!("[SplitService] Finalized split {}", split.id());
        Ok(split)
    }

    /// Renders a document for download.
    pub async fn download_document(&self, document_id: &str) -> Result<RenderedDocument> {
        let uow = self.uow_factory.begin().await?;
        let result = load_by_document(uow.split_repository(), document_id).await;
        let split = finish(uow.as_ref(), result).await?;

        let document = split.document(document_id).ok_or_else(|| {
            DomainError::not_found(format!("document {} not found", document_id))
        })?;
        self.render_service.render_document(document).await
    }

    /// Deletes a split with all of its documents and pages.
    pub async fn delete_split(&self, split_id: &str) -> Result<()> {
        let uow = self.uow_factory.begin().await?;
        let result = delete_split_in(uow.split_repository(), split_id).await;
        finish(uow.as_ref(), result).await?;
        info!("[SplitService] Deleted split {}", split_id);
        Ok(())
    }
}

/// Commits on success, rolls back on failure and returns the original error.
async fn finish<T>(uow: &dyn UnitOfWork, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(
                    "[SplitService] Rollback failed after error ({}): {}",
                    err, rollback_err
                );
            }
            Err(err)
        }
    }
}

async fn load_required(repo: &dyn SplitRepository, split_id: &str) -> Result<Split> {
    repo.get(split_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("split {} not found", split_id)))
}

async fn load_by_document(repo: &dyn SplitRepository, document_id: &str) -> Result<Split> {
    let split_id = repo.get_split_id_by_document_id(document_id).await?;
    load_required(repo, &split_id).await
}

fn cloned_document(split: &Split, document_id: &str) -> Result<Document> {
    split
        .document(document_id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("document {} not found", document_id)))
}

// ============================================================================
// Use case bodies, run inside an open unit of work
// ============================================================================

async fn store_new(repo: &dyn SplitRepository, split: &Split) -> Result<()> {
    if repo.get(split.id()).await?.is_some() {
        return Err(DomainError::conflict(format!(
            "split {} already exists",
            split.id()
        )));
    }
    repo.save(split).await
}

async fn save_touched(repo: &dyn SplitRepository, split: &mut Split) -> Result<()> {
    split.touch(Utc::now());
    repo.save(split).await
}

async fn update_metadata_in(
    repo: &dyn SplitRepository,
    document_id: &str,
    metadata: DocumentMetadata,
) -> Result<Document> {
    let mut split = load_by_document(repo, document_id).await?;
    split.update_document_metadata(document_id, metadata)?;
    save_touched(repo, &mut split).await?;
    cloned_document(&split, document_id)
}

async fn move_pages_in(
    repo: &dyn SplitRepository,
    split_id: &str,
    from_document_id: &str,
    to_document_id: &str,
    page_ids: &[String],
) -> Result<MovedPages> {
    let mut split = load_required(repo, split_id).await?;
    split.move_pages(from_document_id, to_document_id, page_ids)?;
    save_touched(repo, &mut split).await?;
    Ok(MovedPages {
        from_document: cloned_document(&split, from_document_id)?,
        to_document: cloned_document(&split, to_document_id)?,
    })
}

async fn create_document_in(
    repo: &dyn SplitRepository,
    split_id: &str,
    draft: DocumentDraft,
    page_ids: &[String],
) -> Result<Document> {
    let mut split = load_required(repo, split_id).await?;
    let document = split
        .create_document(Uuid::new_v4().to_string(), draft, page_ids)?
        .clone();
    save_touched(repo, &mut split).await?;
    Ok(document)
}

async fn assign_pages_in(
    repo: &dyn SplitRepository,
    split_id: &str,
    document_id: &str,
    page_ids: &[String],
) -> Result<Document> {
    let mut split = load_required(repo, split_id).await?;
    split.assign_pages(document_id, page_ids)?;
    save_touched(repo, &mut split).await?;
    cloned_document(&split, document_id)
}

async fn delete_document_in(repo: &dyn SplitRepository, document_id: &str) -> Result<Split> {
    let mut split = load_by_document(repo, document_id).await?;
    split.remove_document(document_id)?;
    save_touched(repo, &mut split).await?;
    Ok(split)
}

async fn finalize_in(repo: &dyn SplitRepository, split_id: &str) -> Result<Split> {
    let mut split = load_required(repo, split_id).await?;
    split.finalize(Utc::now())?;
    repo.save(&split).await?;
    Ok(split)
}

async fn delete_split_in(repo: &dyn SplitRepository, split_id: &str) -> Result<()> {
    load_required(repo, split_id).await?;
    repo.delete(split_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_service::PlaceholderRenderService;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records how units of work were finished. Saves go straight to the
    /// shared map, so these tests only check commit/rollback bookkeeping.
    #[derive(Default)]
    struct Recorder {
        splits: Mutex<HashMap<String, Split>>,
        commits: Mutex<u32>,
        rollbacks: Mutex<u32>,
    }

    struct MemoryRepository(Arc<Recorder>);

    #[async_trait]
    impl SplitRepository for MemoryRepository {
        async fn get(&self, split_id: &str) -> Result<Option<Split>> {
            Ok(self.0.splits.lock().unwrap().get(split_id).cloned())
        }

        async fn save(&self, split: &Split) -> Result<()> {
            self.0
                .splits
                .lock()
                .unwrap()
                .insert(split.id().to_string(), split.clone());
            Ok(())
        }

        async fn delete(&self, split_id: &str) -> Result<()> {
            self.0.splits.lock().unwrap().remove(split_id);
            Ok(())
        }

        async fn list_by_client_id(&self, client_id: &str) -> Result<Vec<Split>> {
            Ok(self
                .0
                .splits
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.client_id() == client_id)
                .cloned()
                .collect())
        }

        async fn get_split_id_by_document_id(&self, document_id: &str) -> Result<String> {
            self.0
                .splits
                .lock()
                .unwrap()
                .values()
                .find(|s| s.document(document_id).is_some())
                .map(|s| s.id().to_string())
                .ok_or_else(|| DomainError::not_found("document not found"))
        }
    }

    struct MemoryUnitOfWork {
        repo: MemoryRepository,
    }

    #[async_trait]
    impl UnitOfWork for MemoryUnitOfWork {
        fn split_repository(&self) -> &dyn SplitRepository {
            &self.repo
        }

        async fn commit(&self) -> Result<()> {
            *self.repo.0.commits.lock().unwrap() += 1;
            Ok(())
        }

        async fn rollback(&self) -> Result<()> {
            *self.repo.0.rollbacks.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct MemoryFactory(Arc<Recorder>);

    #[async_trait]
    impl UnitOfWorkFactory for MemoryFactory {
        async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
            Ok(Box::new(MemoryUnitOfWork {
                repo: MemoryRepository(Arc::clone(&self.0)),
            }))
        }
    }

    const JSON: &str = r#"{
        "split_id": "s1",
        "client_id": "c1",
        "documents": [
            {"id": "d1", "name": "W2", "classification": "W-2", "file_name": "w2.pdf",
             "page_urls": ["page_1.png"]}
        ]
    }"#;

    fn service() -> (SplitService, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let service = SplitService::new(
            Arc::new(MemoryFactory(Arc::clone(&recorder))),
            Arc::new(PlaceholderRenderService::new()),
        );
        (service, recorder)
    }

    fn counts(recorder: &Recorder) -> (u32, u32) {
        (
            *recorder.commits.lock().unwrap(),
            *recorder.rollbacks.lock().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_success_commits_once() {
        let (service, recorder) = service();
        service.ingest_split(JSON).await.unwrap();
        assert_eq!(counts(&recorder), (1, 0));
    }

    #[tokio::test]
    async fn test_failure_rolls_back_once() {
        let (service, recorder) = service();
        service.ingest_split(JSON).await.unwrap();

        let err = service.ingest_split(JSON).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(counts(&recorder), (1, 1));

        let err = service.finalize_split("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(counts(&recorder), (1, 2));
    }

    #[tokio::test]
    async fn test_invalid_json_never_opens_unit_of_work() {
        let (service, recorder) = service();
        assert!(service.ingest_split("{").await.unwrap_err().is_validation());
        assert_eq!(counts(&recorder), (0, 0));
    }

    #[tokio::test]
    async fn test_download_renders_document() {
        let (service, _) = service();
        service.ingest_split(JSON).await.unwrap();

        let rendered = service.download_document("d1").await.unwrap();
        assert_eq!(rendered.filename, "w2.pdf");
        assert_eq!(rendered.content_type, "application/pdf");
        assert!(rendered.data.starts_with(b"%PDF"));

        let err = service.download_document("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
