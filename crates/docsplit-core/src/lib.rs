//! Domain layer for docsplit.
//!
//! A [`Split`](split::Split) is the result of an AI model cutting a scanned
//! bundle into logical documents. Users review it, fix page assignments and
//! metadata, then finalize it. This crate holds the aggregate, its rules and
//! the ports the outer layers implement.

pub mod error;
pub mod render;
pub mod split;
pub mod uow;

// Re-export common error type
pub use error::{DomainError, ErrorKind, Result};
