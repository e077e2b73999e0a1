//! Error types for docwrite
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! | Variant | Raised | Before store call |
//! |---------|--------|-------------------|
//! | `InvalidFieldName` | field starts with `.` or `$` | yes |
//! | `EmptyPath` | root-level change reached the compiler | yes |
//! | `InvalidDocument` | document root is not an object / no id | yes |
//! | `Path` | malformed dotted path | yes |
//! | `Config` | configuration could not be loaded | yes |
//! | `UnmatchedUpdate` / `UnmatchedDelete` | store matched fewer docs than expected | no |
//! | `UnsupportedOperation` | batch result references an unknown op shape | no |
//! | `Store` | the store collaborator failed | no |

use crate::document::Document;
use crate::path::PathError;
use crate::types::Namespace;
use std::fmt;
use thiserror::Error;

/// Result type alias for docwrite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error source carried by [`StoreError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by the store collaborator (network, server-side rejection)
///
/// Propagated to the caller as-is; nothing in this crate retries.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl StoreError {
    /// Create a store error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping an underlying cause
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The store's message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Details of a write whose acknowledged count fell short
///
/// Batch writes only know aggregate counts, so `filter` and `id` are set for
/// single-document writes only.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedWrite {
    /// Store coordinates the write was aimed at
    pub namespace: Namespace,
    /// Number of documents the write was expected to match
    pub expected: u64,
    /// Number of documents the store reported as matched
    pub observed: u64,
    /// Filter used by a single-document write
    pub filter: Option<Document>,
    /// Identifier of the document a single-document write targeted
    pub id: Option<Document>,
}

impl fmt::Display for UnmatchedWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} ack(s) on {}, observed {}",
            self.expected, self.namespace, self.observed
        )?;
        if let Some(id) = &self.id {
            write!(f, " for document {}", id)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " (filter {})", filter)?;
        }
        Ok(())
    }
}

/// Error types for docwrite
#[derive(Debug, Error)]
pub enum Error {
    /// Field name cannot be expressed as a dotted path segment
    #[error(
        "field name '{field}' at '{path}' is unsupported: names starting with '.' or '$' \
         cannot be addressed by a dotted path"
    )]
    InvalidFieldName {
        /// The offending field name
        field: String,
        /// Dotted path of the object holding the field
        path: String,
    },

    /// A root-level change cannot be expressed as a partial update
    #[error("root-level change cannot be expressed as a partial update")]
    EmptyPath,

    /// Document handed to a write does not have the expected shape
    #[error("invalid document: {reason}")]
    InvalidDocument {
        /// What is wrong with the document
        reason: String,
    },

    /// Malformed or unaddressable path
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Update or replace matched fewer documents than expected
    #[error("lost update: {0}")]
    UnmatchedUpdate(Box<UnmatchedWrite>),

    /// Delete removed fewer documents than expected
    #[error("lost delete: {0}")]
    UnmatchedDelete(Box<UnmatchedWrite>),

    /// Batch result references an operation this crate did not submit
    #[error("unsupported bulk operation at index {index}: {reason}")]
    UnsupportedOperation {
        /// Physical operation index
        index: usize,
        /// What was unexpected
        reason: String,
    },

    /// The store collaborator failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an InvalidDocument error
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Error::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// True for errors raised before any store interaction
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidFieldName { .. }
                | Error::EmptyPath
                | Error::InvalidDocument { .. }
                | Error::Path(_)
                | Error::Config(_)
        )
    }

    /// The unmatched-write details, for `UnmatchedUpdate` / `UnmatchedDelete`
    pub fn unmatched(&self) -> Option<&UnmatchedWrite> {
        match self {
            Error::UnmatchedUpdate(w) | Error::UnmatchedDelete(w) => Some(w),
            _ => None,
        }
    }
}
