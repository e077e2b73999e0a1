//! Core types for docwrite
//!
//! This crate defines the foundational types used throughout the system:
//! - Document: Object/array/scalar tree with an explicit absent sentinel
//! - DocPath / PathSegment: Paths into a document, rendered as dotted paths
//! - DocId / Namespace: Store-generated identifiers and store coordinates
//! - Sanitizer: Absent-marker stripping for values bound to a store
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod path;
pub mod sanitize;
pub mod types;

pub use document::{Document, Fields, ABSENT};
pub use error::{BoxError, Error, Result, StoreError, UnmatchedWrite};
pub use path::{
    get_at_path, set_at_path, unset_at_path, DocPath, PathError, PathSegment, MAX_ARRAY_PADDING,
    PATH_SEPARATOR,
};
pub use sanitize::{is_sanitized, sanitize, sanitize_in_place, sanitized_copy};
pub use types::{DocId, Namespace, ID_FIELD};
