use std::sync::Arc;

use docsplit_application::{PlaceholderRenderService, SplitService};
use docsplit_core::split::{DocumentDraft, DocumentMetadata, SplitStatus};
use docsplit_infrastructure::{DatabaseConfig, SqliteUnitOfWorkFactory};
use tempfile::TempDir;

const BUNDLE: &str = r#"{
    "split_id": "s1",
    "client_id": "c1",
    "status": "draft",
    "documents": [
        {"id": "d1", "name": "W2", "classification": "W-2", "file_name": "w2.pdf",
         "page_urls": ["page_1.png", "page_2.png"]},
        {"id": "d2", "name": "1099", "classification": "1099", "file_name": "1099.pdf",
         "page_urls": ["page_3.png"]}
    ]
}"#;

async fn create_service(temp_dir: &TempDir) -> SplitService {
    let config = DatabaseConfig::at(temp_dir.path().join("docsplit.db"));
    let factory = SqliteUnitOfWorkFactory::open(&config).await.unwrap();
    SplitService::new(Arc::new(factory), Arc::new(PlaceholderRenderService::new()))
}

fn page_ids(split: &docsplit_core::split::Split, document_id: &str) -> Vec<String> {
    split.document(document_id).unwrap().page_ids()
}

#[tokio::test]
async fn test_ingest_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;

    let ingested = service.ingest_split(BUNDLE).await.unwrap();
    let loaded = service.load_split("s1").await.unwrap();

    assert_eq!(loaded.status(), SplitStatus::Draft);
    assert_eq!(loaded.documents().len(), 2);
    assert_eq!(loaded.document("d1"), ingested.document("d1"));

    let err = service.ingest_split(BUNDLE).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_load_missing_split_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;

    assert!(service.load_split("nope").await.unwrap_err().is_not_found());
    assert!(service.delete_split("nope").await.unwrap_err().is_not_found());
    assert!(service.list_splits("c1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_document_metadata_persists() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;
    service.ingest_split(BUNDLE).await.unwrap();

    let doc = service
        .update_document_metadata(
            "d2",
            DocumentMetadata {
                name: Some("Interest income".to_string()),
                ..DocumentMetadata::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(doc.name, "Interest income");
    assert_eq!(doc.classification, "1099");

    let loaded = service.load_split("s1").await.unwrap();
    assert_eq!(loaded.document("d2").unwrap().name, "Interest income");
    assert!(loaded.updated_at >= loaded.created_at);

    let err = service
        .update_document_metadata("missing", DocumentMetadata::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_move_pages_persists_both_documents() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;
    let split = service.ingest_split(BUNDLE).await.unwrap();
    let moving = page_ids(&split, "d1")[1..].to_vec();

    let moved = service.move_pages("s1", "d1", "d2", &moving).await.unwrap();
    assert_eq!(moved.from_document.end_page(), "page_1.png");
    assert_eq!(moved.to_document.start_page(), "page_2.png");

    let loaded = service.load_split("s1").await.unwrap();
    assert_eq!(loaded.document("d1").unwrap().pages().len(), 1);
    assert_eq!(loaded.document("d2").unwrap().pages().len(), 2);
}

#[tokio::test]
async fn test_failed_operation_leaves_storage_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;
    let split = service.ingest_split(BUNDLE).await.unwrap();
    let target_page = page_ids(&split, "d2");

    let err = service
        .move_pages("s1", "d1", "d2", &target_page)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let loaded = service.load_split("s1").await.unwrap();
    assert_eq!(loaded.updated_at, split.updated_at);
    assert_eq!(loaded.document("d2"), split.document("d2"));
}

#[tokio::test]
async fn test_delete_document_then_rebuild_and_finalize() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;
    service.ingest_split(BUNDLE).await.unwrap();

    let split = service.delete_document("d1").await.unwrap();
    assert_eq!(split.unassigned_pages().len(), 2);
    let pool: Vec<String> = split.unassigned_pages().iter().map(|p| p.id.clone()).collect();

    let err = service.finalize_split("s1").await.unwrap_err();
    assert!(err.is_validation());

    let draft = DocumentDraft {
        name: "Paystub".to_string(),
        classification: "Paystub".to_string(),
        filename: "paystub.pdf".to_string(),
        short_description: "January".to_string(),
    };
    let created = service
        .create_document("s1", draft, &pool[..1])
        .await
        .unwrap();
    assert_eq!(created.start_page(), "page_1.png");

    let assigned = service
        .assign_pages("s1", &created.id, &pool[1..])
        .await
        .unwrap();
    assert_eq!(assigned.end_page(), "page_2.png");

    let finalized = service.finalize_split("s1").await.unwrap();
    assert_eq!(finalized.status(), SplitStatus::Finalized);

    let loaded = service.load_split("s1").await.unwrap();
    assert_eq!(loaded.status(), SplitStatus::Finalized);
    assert_eq!(loaded.finalized_at(), finalized.finalized_at());

    let err = service.delete_document(&created.id).await.unwrap_err();
    assert!(err.is_conflict());
    let err = service.finalize_split("s1").await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_download_and_delete_split() {
    let temp_dir = TempDir::new().unwrap();
    let service = create_service(&temp_dir).await;
    service.ingest_split(BUNDLE).await.unwrap();

    let rendered = service.download_document("d1").await.unwrap();
    assert_eq!(rendered.filename, "w2.pdf");
    assert!(rendered.data.starts_with(b"%PDF-1.4"));

    service.delete_split("s1").await.unwrap();
    assert!(service.load_split("s1").await.unwrap_err().is_not_found());
    assert!(service.download_document("d1").await.unwrap_err().is_not_found());
    assert!(service.list_splits("c1").await.unwrap().is_empty());
}
