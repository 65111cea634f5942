//! Construction of a [`Split`] from the JSON produced by the splitting model.
//!
//! ```json
//! {
//!   "split_id": "s1",
//!   "client_id": "c1",
//!   "status": "draft",
//!   "documents": [
//!     {
//!       "id": "d1",
//!       "name": "John's W-2",
//!       "classification": "W-2",
//!       "file_name": "w2.pdf",
//!       "short_description": "Wages",
//!       "page_urls": ["page_1.png", "page_2.png"]
//!     }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::aggregate::Split;
use super::document::{Document, DocumentDraft};
use super::page::Page;
use super::status::SplitStatus;
use crate::error::{DomainError, Result};

#[derive(Debug, Deserialize)]
struct SplitDescription {
    split_id: String,
    client_id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    documents: Vec<DocumentDescription>,
}

#[derive(Debug, Deserialize)]
struct DocumentDescription {
    #[serde(default)]
    id: Option<String>,
    name: String,
    classification: String,
    file_name: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    page_urls: Vec<String>,
}

impl Split {
    /// Parses a split description, stamping both timestamps with the current time.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_at(json, Utc::now())
    }

    /// Parses a split description using `now` for `created_at` / `updated_at`.
    ///
    /// The result is always a draft. A description that claims any other
    /// status is rejected. Documents without an `id` get a fresh UUID.
    pub fn from_json_at(json: &str, now: DateTime<Utc>) -> Result<Self> {
        let description: SplitDescription = serde_json::from_str(json)?;

        if let Some(status) = description.status.as_deref().filter(|s| !s.is_empty()) {
            let status: SplitStatus = status.parse()?;
            if status != SplitStatus::Draft {
                return Err(DomainError::validation(format!(
                    "new split must be in draft status, got {}",
                    status
                )));
            }
        }

        let mut split = Split::new(description.split_id, description.client_id, now);
        if split.id().is_empty() {
            return Err(DomainError::validation("split ID is required"));
        }
        if split.client_id().is_empty() {
            return Err(DomainError::validation("client ID is required"));
        }

        for doc in description.documents {
            let pages = doc
                .page_urls
                .iter()
                .map(|url| Page::from_url(split.id().to_string(), url.as_str()))
                .collect::<Result<Vec<_>>>()?;

            let id = doc
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let draft = DocumentDraft {
                name: doc.name,
                classification: doc.classification,
                filename: doc.file_name,
                short_description: doc.short_description,
            };

            let document = Document::new(id, split.id().to_string(), draft, pages)?;
            split.add_document(document)?;
        }

        split.validate()?;
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "split_id": "split123",
        "client_id": "client456",
        "status": "draft",
        "documents": [
            {
                "id": "doc1",
                "name": "John's W-2",
                "classification": "W-2",
                "file_name": "john_w2.pdf",
                "short_description": "W-2 for John",
                "page_urls": ["page_2.png", "page_1.png"]
            },
            {
                "id": "doc2",
                "name": "Invoice",
                "classification": "Invoice",
                "file_name": "invoice.pdf",
                "page_urls": ["page_3.png"]
            }
        ]
    }"#;

    #[test]
    fn test_from_json_builds_draft_split() {
        let split = Split::from_json(SAMPLE).unwrap();

        assert_eq!(split.id(), "split123");
        assert_eq!(split.client_id(), "client456");
        assert_eq!(split.status(), SplitStatus::Draft);
        assert_eq!(split.documents().len(), 2);
        assert!(split.unassigned_pages().is_empty());
        assert_eq!(split.created_at, split.updated_at);

        let doc = split.document("doc1").unwrap();
        assert_eq!(doc.filename, "john_w2.pdf");
        assert_eq!(doc.start_page(), "page_1.png");
        assert_eq!(doc.end_page(), "page_2.png");
        assert!(doc.pages().iter().all(|p| p.split_id == "split123"));

        assert_eq!(split.document("doc2").unwrap().short_description, "");
    }

    #[test]
    fn test_from_json_generates_missing_document_ids() {
        let json = r#"{
            "split_id": "s1",
            "client_id": "c1",
            "documents": [
                {"name": "A", "classification": "W-2", "file_name": "a.pdf", "page_urls": ["page_1.png"]}
            ]
        }"#;
        let split = Split::from_json(json).unwrap();
        assert_eq!(split.documents().len(), 1);
        assert!(Uuid::parse_str(&split.documents()[0].id).is_ok());
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = Split::from_json("{not json").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("malformed split JSON"));
    }

    #[test]
    fn test_from_json_rejects_bad_page_url() {
        let json = r#"{
            "split_id": "s1",
            "client_id": "c1",
            "documents": [
                {"id": "d1", "name": "A", "classification": "W-2", "file_name": "a.pdf", "page_urls": ["scan.jpg"]}
            ]
        }"#;
        let err = Split::from_json(json).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid page URL format"));
    }

    #[test]
    fn test_from_json_rejects_document_without_pages() {
        let json = r#"{
            "split_id": "s1",
            "client_id": "c1",
            "documents": [
                {"id": "d1", "name": "A", "classification": "W-2", "file_name": "a.pdf", "page_urls": []}
            ]
        }"#;
        let err = Split::from_json(json).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_json_rejects_duplicate_document_ids() {
        let json = r#"{
            "split_id": "s1",
            "client_id": "c1",
            "documents": [
                {"id": "d1", "name": "A", "classification": "W-2", "file_name": "a.pdf", "page_urls": ["page_1.png"]},
                {"id": "d1", "name": "B", "classification": "W-2", "file_name": "b.pdf", "page_urls": ["page_2.png"]}
            ]
        }"#;
        let err = Split::from_json(json).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_from_json_rejects_finalized_status() {
        let json = r#"{"split_id": "s1", "client_id": "c1", "status": "finalized"}"#;
        let err = Split::from_json(json).unwrap_err();
        assert!(err.is_validation());

        let json = r#"{"split_id": "s1", "client_id": "c1", "status": "unknown"}"#;
        assert!(Split::from_json(json).unwrap_err().is_validation());
    }

    #[test]
    fn test_from_json_requires_ids() {
        let json = r#"{"split_id": "", "client_id": "c1"}"#;
        assert!(Split::from_json(json).unwrap_err().is_validation());

        let json = r#"{"split_id": "s1", "client_id": ""}"#;
        assert!(Split::from_json(json).unwrap_err().is_validation());
    }
}
