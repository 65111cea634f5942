//! Page entity.
//!
//! A page holds only metadata for one scanned page of the source bundle; the
//! image itself lives behind `url`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DomainError, Result};

static PAGE_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^page_([0-9]+)\.png$").expect("page URL pattern is valid"));

/// A single scanned page, optionally owned by a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Unique page identifier (UUID v4 for pages created from URLs).
    pub id: String,
    /// ID of the split this page belongs to.
    pub split_id: String,
    /// Owning document, `None` while the page sits in the unassigned pool.
    document_id: Option<String>,
    /// 1-based position in the source bundle.
    pub page_number: u32,
    /// Location of the page content.
    pub url: String,
}

impl Page {
    /// Creates an unassigned page from a URL of the form `page_<N>.png`.
    pub fn from_url(split_id: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let page_number = parse_page_number(&url)?;
        let page = Self {
            id: Uuid::new_v4().to_string(),
            split_id: split_id.into(),
            document_id: None,
            page_number,
            url,
        };
        page.validate()?;
        Ok(page)
    }

    /// Rebuilds a page from stored fields without parsing the URL.
    pub fn restore(
        id: impl Into<String>,
        split_id: impl Into<String>,
        document_id: Option<String>,
        page_number: u32,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            split_id: split_id.into(),
            document_id,
            page_number,
            url: url.into(),
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn is_assigned(&self) -> bool {
        self.document_id.is_some()
    }

    pub fn assign_to_document(&mut self, document_id: &str) -> Result<()> {
        if self.is_assigned() {
            return Err(DomainError::conflict(format!(
                "page {} is already assigned to a document",
                self.id
            )));
        }
        self.document_id = Some(document_id.to_string());
        Ok(())
    }

    pub fn unassign(&mut self) {
        self.document_id = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("page id is required"));
        }
        if self.split_id.is_empty() {
            return Err(DomainError::validation("split id is required"));
        }
        if self.url.is_empty() {
            return Err(DomainError::validation("url is required"));
        }
        Ok(())
    }
}

fn parse_page_number(url: &str) -> Result<u32> {
    let captures = PAGE_URL_PATTERN.captures(url).ok_or_else(|| {
        DomainError::validation(format!("invalid page URL format: {}", url))
    })?;
    let number = captures[1]
        .parse::<u32>()
        .map_err(|e| DomainError::validation(format!("invalid page number in {}: {}", url, e)))?;
    if number == 0 {
        return Err(DomainError::validation(format!(
            "page numbers start at 1, got {}",
            url
        )));
    }
    Ok(number)
}
