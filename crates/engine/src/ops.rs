//! Physical write operations and their store-reported results

use docwrite_core::Document;
use docwrite_diff::UpdateInstruction;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a physical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// insertOne
    Insert,
    /// updateOne
    Update,
    /// replaceOne
    Replace,
    /// deleteOne
    Delete,
}

impl OpKind {
    /// Store-side operation name
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Insert => "insertOne",
            OpKind::Update => "updateOne",
            OpKind::Replace => "replaceOne",
            OpKind::Delete => "deleteOne",
        }
    }

    /// True for operations counted against the matched total
    pub fn is_update(&self) -> bool {
        matches!(self, OpKind::Update | OpKind::Replace)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a batch write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a sanitized document
    InsertOne {
        /// Document to insert
        document: Document,
    },
    /// Partially update the first document matching `filter`
    UpdateOne {
        /// Identifying filter
        filter: Document,
        /// `$set` / `$unset` body
        update: UpdateInstruction,
        /// Insert when nothing matches
        upsert: bool,
    },
    /// Replace the first document matching `filter`
    ReplaceOne {
        /// Identifying filter
        filter: Document,
        /// Sanitized replacement document
        replacement: Document,
        /// Insert when nothing matches
        upsert: bool,
    },
    /// Delete the first document matching `filter`
    DeleteOne {
        /// Identifying filter
        filter: Document,
    },
}

impl WriteOp {
    /// Operation kind
    pub fn kind(&self) -> OpKind {
        match self {
            WriteOp::InsertOne { .. } => OpKind::Insert,
            WriteOp::UpdateOne { .. } => OpKind::Update,
            WriteOp::ReplaceOne { .. } => OpKind::Replace,
            WriteOp::DeleteOne { .. } => OpKind::Delete,
        }
    }

    /// True if the operation may insert a document when nothing matches
    pub fn is_upsert(&self) -> bool {
        match self {
            WriteOp::UpdateOne { upsert, .. } | WriteOp::ReplaceOne { upsert, .. } => *upsert,
            _ => false,
        }
    }

    /// Identifying filter, None for inserts
    pub fn filter(&self) -> Option<&Document> {
        match self {
            WriteOp::InsertOne { .. } => None,
            WriteOp::UpdateOne { filter, .. }
            | WriteOp::ReplaceOne { filter, .. }
            | WriteOp::DeleteOne { filter } => Some(filter),
        }
    }
}

/// Result of insertOne
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    /// Identifier of the inserted document
    pub inserted_id: Document,
}

/// Result of updateOne / replaceOne
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    /// Documents matched by the filter
    pub matched_count: u64,
    /// Documents actually changed
    pub modified_count: u64,
    /// Identifier of the inserted document when the write upserted
    pub upserted_id: Option<Document>,
}

impl UpdateResult {
    /// Matched plus upserted, the count an identifier-filtered write expects to be 1
    pub fn acknowledged(&self) -> u64 {
        self.matched_count + u64::from(self.upserted_id.is_some())
    }
}

/// Result of deleteOne
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteResult {
    /// Documents removed
    pub deleted_count: u64,
}

/// Result of a batch write
///
/// Identifier maps are keyed by the operation's position in the submitted
/// batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Documents matched across update and replace operations
    pub matched_count: u64,
    /// Documents changed across update and replace operations
    pub modified_count: u64,
    /// Documents removed across delete operations
    pub deleted_count: u64,
    /// Generated identifiers of inserts, by operation index
    pub inserted_ids: BTreeMap<usize, Document>,
    /// Generated identifiers of upserts, by operation index
    pub upserted_ids: BTreeMap<usize, Document>,
}

impl BatchResult {
    /// Matched plus upserted across update and replace operations
    pub fn acknowledged_updates(&self) -> u64 {
        self.matched_count + self.upserted_ids.len() as u64
    }
}
