//! Write reconciliation for docwrite
//!
//! This crate turns logical document writes into physical store operations:
//! - Collection: the store collaborator trait, one method per round-trip
//! - WriteReconciler: one batch per call, results mapped back to actions
//! - CollectionAdapter: reads and single-document writes
//! - ReconcilePolicy / ModeStrategy / FilterStrategy: how writes are shaped
//! - AdapterConfig: the same settings loaded from `docwrite.toml`
//! - MemoryCollection: in-memory reference store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod adapter;
pub mod config;
pub mod filter;
pub mod memory;
pub mod ops;
pub mod options;
pub mod policy;
pub mod reconcile;
pub mod store;

pub use action::{ActionState, WriteAction, WriteOutcome};
pub use adapter::{CollectionAdapter, Documents};
pub use config::{AdapterConfig, CONFIG_FILE_NAME};
pub use filter::{FilterFn, FilterStrategy};
pub use memory::MemoryCollection;
pub use ops::{BatchResult, DeleteResult, InsertOneResult, OpKind, UpdateResult, WriteOp};
pub use options::{ReadOptions, Session, WriteOptions};
pub use policy::{AutoMode, ModeContext, ModeStrategy, ReconcilePolicy, UnmatchedPolicy, UpdateMode};
pub use reconcile::{OpIndex, WriteReconciler, WriteSettings};
pub use store::{Collection, DocumentCursor, StoreResult};
