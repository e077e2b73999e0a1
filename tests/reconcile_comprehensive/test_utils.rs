//! Test utilities for reconcile comprehensive tests
//!
//! Provides helpers for building collections, adapters and documents.

pub use docwrite::core::{Document, Namespace};
pub use docwrite::engine::{
    ActionState, AdapterConfig, CollectionAdapter, MemoryCollection, ReconcilePolicy, Session,
    UnmatchedPolicy, UpdateMode, WriteAction, WriteOptions, WriteOutcome, WriteSettings,
};
pub use docwrite::Error;
pub use serde_json::json;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Namespace used across the suite
pub fn namespace() -> Namespace {
    Namespace::new("shop", "orders")
}

/// Document from a JSON literal
pub fn doc(value: serde_json::Value) -> Document {
    Document::from(value)
}

/// Order document with an integer id
pub fn order(id: i64, qty: i64) -> Document {
    Document::object().with("_id", id).with("qty", qty)
}

/// Collection seeded with `documents`
pub fn seeded(documents: Vec<Document>) -> MemoryCollection {
    MemoryCollection::with_documents(namespace(), documents)
}

/// Adapter over a seeded collection with a pinned update mode
pub fn adapter(mode: UpdateMode, documents: Vec<Document>) -> CollectionAdapter<MemoryCollection> {
    init_tracing();
    CollectionAdapter::new(seeded(documents)).with_policy(ReconcilePolicy::with_mode(mode))
}

/// States of every outcome, in action order
pub fn states(outcomes: &[WriteOutcome]) -> Vec<ActionState> {
    outcomes.iter().map(|o| o.state).collect()
}
