//! Core identifier types
//!
//! This module defines:
//! - DocId: Store-generated document identifier
//! - Namespace: Store coordinates (database + collection)

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of the identifier field every persisted document carries.
pub const ID_FIELD: &str = "_id";

/// Store-generated document identifier
///
/// A DocId is a wrapper around a UUID v4. Stores hand these out when a
/// document is inserted (or upserted) without an explicit `_id`, and the
/// reconciler backfills them onto the logical document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(Uuid);

impl DocId {
    /// Create a new random DocId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store coordinates (database + collection)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// Database name
    pub database: String,
    /// Collection name
    pub collection: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self { database: database.into(), collection: collection.into() }
    }

    /// Human readable adapter name, e.g. `Store@shop:orders`
    pub fn adapter_name(&self) -> String {
        format!("Store@{}:{}", self.database, self.collection)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}
