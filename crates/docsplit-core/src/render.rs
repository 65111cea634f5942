//! Render port used when a document is downloaded.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::split::Document;

/// A document rendered into a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Turns a document into file bytes.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn render_document(&self, document: &Document) -> Result<RenderedDocument>;
}
