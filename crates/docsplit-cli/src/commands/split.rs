use anyhow::Result;
use serde_json::json;
use std::path::Path;

use docsplit_application::SplitService;

use super::utils::{print_json, read_input};

pub async fn ingest(service: &SplitService, file: &Path) -> Result<()> {
    let json = read_input(file)?;
    let split = service.ingest_split(&json).await?;
    print_json(&split)
}

pub async fn show(service: &SplitService, split_id: &str) -> Result<()> {
    let split = service.load_split(split_id).await?;
    print_json(&split)
}

pub async fn list(service: &SplitService, client_id: &str) -> Result<()> {
    let splits = service.list_splits(client_id).await?;
    let summaries: Vec<_> = splits
        .iter()
        .map(|s| {
            json!({
                "id": s.id(),
                "client_id": s.client_id(),
                "status": s.status(),
                "documents": s.documents().len(),
                "unassigned_pages": s.unassigned_pages().len(),
                "created_at": s.created_at,
                "updated_at": s.updated_at,
            })
        })
        .collect();
    print_json(&summaries)
}

pub async fn finalize(service: &SplitService, split_id: &str) -> Result<()> {
    let split = service.finalize_split(split_id).await?;
    print_json(&json!({
        "id": split.id(),
        "status": split.status(),
        "finalized_at": split.finalized_at(),
    }))
}

pub async fn delete(service: &SplitService, split_id: &str) -> Result<()> {
    service.delete_split(split_id).await?;
    print_json(&json!({ "deleted": split_id }))
}
