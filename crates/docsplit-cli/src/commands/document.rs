use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

use docsplit_application::SplitService;
use docsplit_core::split::{DocumentDraft, DocumentMetadata};

use super::utils::print_json;

pub async fn rename(
    service: &SplitService,
    document_id: &str,
    name: Option<String>,
    classification: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let metadata = DocumentMetadata {
        name,
        classification,
        short_description: description,
    };
    let document = service
        .update_document_metadata(document_id, metadata)
        .await?;
    print_json(&document)
}

pub async fn move_pages(
    service: &SplitService,
    split_id: &str,
    from_document_id: &str,
    to_document_id: &str,
    page_ids: &[String],
) -> Result<()> {
    let moved = service
        .move_pages(split_id, from_document_id, to_document_id, page_ids)
        .await?;
    print_json(&moved)
}

pub async fn create(
    service: &SplitService,
    split_id: &str,
    draft: DocumentDraft,
    page_ids: &[String],
) -> Result<()> {
    let document = service.create_document(split_id, draft, page_ids).await?;
    print_json(&document)
}

pub async fn assign(
    service: &SplitService,
    split_id: &str,
    document_id: &str,
    page_ids: &[String],
) -> Result<()> {
    let document = service
        .assign_pages(split_id, document_id, page_ids)
        .await?;
    print_json(&document)
}

pub async fn delete(service: &SplitService, document_id: &str) -> Result<()> {
    let split = service.delete_document(document_id).await?;
    print_json(&json!({
        "deleted": document_id,
        "split_id": split.id(),
        "unassigned_pages": split.unassigned_pages(),
    }))
}

pub async fn download(
    service: &SplitService,
    document_id: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let rendered = service.download_document(document_id).await?;
    let path = out.unwrap_or_else(|| PathBuf::from(&rendered.filename));
    tokio::fs::write(&path, &rendered.data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    print_json(&json!({
        "filename": rendered.filename,
        "content_type": rendered.content_type,
        "path": path,
        "bytes": rendered.data.len(),
    }))
}
