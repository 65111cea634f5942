//! Application layer for docsplit.
//!
//! Use cases that load a split through a unit of work, apply one aggregate
//! operation and persist the result.

pub mod render_service;
pub mod split_service;

pub use render_service::PlaceholderRenderService;
pub use split_service::{MovedPages, SplitService};
