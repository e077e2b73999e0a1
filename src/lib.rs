//! docwrite - structural document diffing and batched write reconciliation
//!
//! docwrite turns the change between two snapshots of a document into the
//! minimal `$set` / `$unset` update a document store needs, and applies
//! batches of creates, updates and deletes in one store round-trip.
//!
//! # Quick Start
//!
//! ```
//! use docwrite::{diff_and_compile, Document};
//!
//! let old = Document::object().with("_id", 1).with("tags", vec!["a", "b", "c"]);
//! let new = Document::object().with("_id", 1).with("tags", vec!["a", "c", "c"]);
//!
//! let update = diff_and_compile(&old, &new)?.expect("tags changed");
//! assert_eq!(update.to_json().to_string(), r#"{"$set":{"tags.1":"c"}}"#);
//! # Ok::<(), docwrite::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`core`]: documents, paths, the sanitizer and the error taxonomy
//! - [`diff`]: the lazy path diff and the update compiler
//! - [`engine`]: the store trait, the reconciler and the collection adapter

pub use docwrite_core as core;
pub use docwrite_diff as diff;
pub use docwrite_engine as engine;

pub use docwrite_core::{
    sanitize, sanitized_copy, DocId, DocPath, Document, Error, Namespace, PathSegment, Result,
    StoreError, UnmatchedWrite,
};
pub use docwrite_diff::{compile, diff_and_compile, ChangeRecord, PathDiff, UpdateInstruction};
pub use docwrite_engine::{
    ActionState, AdapterConfig, Collection, CollectionAdapter, FilterStrategy, MemoryCollection,
    ModeStrategy, ReadOptions, ReconcilePolicy, Session, UnmatchedPolicy, UpdateMode, WriteAction,
    WriteOptions, WriteOutcome, WriteReconciler, WriteSettings,
};
