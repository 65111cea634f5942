//! Error types for docsplit.
//!
//! Errors are classified by [`ErrorKind`] rather than by type. A caller that
//! needs to know whether a wrapped failure was ultimately a conflict or a
//! missing entity walks the cause chain with [`DomainError::root_kind`] or
//! [`DomainError::has_kind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The category of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or a violated structural rule.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The operation is not permitted in the current state.
    Conflict,
    /// Storage or infrastructure failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shared error type for the split aggregate and its ports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}{}", display_cause(.cause))]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<Box<DomainError>>,
}

fn display_cause(cause: &Option<Box<DomainError>>) -> String {
    match cause {
        Some(inner) => format!(": {}", inner),
        None => String::new(),
    }
}

impl DomainError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a NotFound error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attaches the error that caused this one.
    pub fn caused_by(mut self, cause: DomainError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// The kind of the outermost error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&DomainError> {
        self.cause.as_deref()
    }

    /// The kind of the innermost error in the cause chain.
    pub fn root_kind(&self) -> ErrorKind {
        let mut current = self;
        while let Some(inner) = current.cause.as_deref() {
            current = inner;
        }
        current.kind
    }

    /// Returns true if any error in the chain has the given kind.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(err) = current {
            if err.kind == kind {
                return true;
            }
            current = err.cause.as_deref();
        }
        false
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("malformed split JSON: {}", err))
    }
}

/// A type alias for `Result<T, DomainError>`.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause_chain() {
        let err = DomainError::validation("failed to assign page to document")
            .caused_by(DomainError::conflict("page is already assigned to a document"));

        assert_eq!(
            err.to_string(),
            "validation: failed to assign page to document: conflict: page is already assigned to a document"
        );
    }

    #[test]
    fn test_root_kind_walks_chain() {
        let err = DomainError::validation("outer")
            .caused_by(DomainError::validation("middle").caused_by(DomainError::not_found("inner")));

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.root_kind(), ErrorKind::NotFound);
        assert!(err.has_kind(ErrorKind::NotFound));
        assert!(!err.has_kind(ErrorKind::Conflict));
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;

        let err = DomainError::internal("outer").caused_by(DomainError::internal("inner"));
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "internal: inner");
    }

    #[test]
    fn test_json_error_is_validation() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let err: DomainError = parse_err.into();
        assert!(err.is_validation());
    }
}
