//! Split domain module.
//!
//! # Module Structure
//!
//! - `page`, `document`, `aggregate`: the entities and the aggregate root
//! - `status`: split lifecycle status
//! - `ingest`: construction from the splitting model's JSON output
//! - `repository`: persistence trait for the aggregate

mod aggregate;
mod document;
mod ingest;
mod page;
mod status;
pub mod repository;

// Re-export public API
pub use aggregate::{Split, SplitParts};
pub use document::{Document, DocumentDraft, DocumentMetadata};
pub use page::Page;
pub use status::SplitStatus;

pub use repository::SplitRepository;
