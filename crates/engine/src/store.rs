//! Store collaborator abstraction
//!
//! The reconciler and adapter only talk to a store through [`Collection`].
//! Each method is one round-trip; nothing here retries or batches calls
//! on its own.

use crate::ops::{BatchResult, DeleteResult, InsertOneResult, UpdateResult, WriteOp};
use crate::options::{ReadOptions, WriteOptions};
use docwrite_core::{Document, Namespace, StoreError};
use docwrite_diff::UpdateInstruction;

/// Result of a store call
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lazy sequence of documents backed by one store cursor
pub type DocumentCursor<'a> = Box<dyn Iterator<Item = StoreResult<Document>> + Send + 'a>;

/// A single collection of a document store
///
/// Thread safety: implementations must be safe to share across threads.
/// Concurrent writes to the same document race at the store; nothing here
/// arbitrates them.
pub trait Collection: Send + Sync {
    /// Store coordinates of this collection
    fn namespace(&self) -> &Namespace;

    /// First document matching `filter`
    fn find_one(&self, filter: &Document, options: &ReadOptions) -> StoreResult<Option<Document>>;

    /// Every document matching `filter`, read lazily
    fn find<'a>(
        &'a self,
        filter: &Document,
        options: &ReadOptions,
    ) -> StoreResult<DocumentCursor<'a>>;

    /// Insert one document; the store generates `_id` when missing
    fn insert_one(
        &self,
        document: Document,
        options: &WriteOptions,
    ) -> StoreResult<InsertOneResult>;

    /// Apply a partial update to the first document matching `filter`
    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateInstruction,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult>;

    /// Replace the first document matching `filter`
    fn replace_one(
        &self,
        filter: &Document,
        replacement: Document,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult>;

    /// Delete the first document matching `filter`
    fn delete_one(&self, filter: &Document, options: &WriteOptions) -> StoreResult<DeleteResult>;

    /// Submit a batch of operations in one round-trip
    ///
    /// Per-operation upsert flags are carried by the operations; `options`
    /// only contributes the session.
    fn bulk_write(&self, ops: Vec<WriteOp>, options: &WriteOptions) -> StoreResult<BatchResult>;
}

impl<C: Collection + ?Sized> Collection for &C {
    fn namespace(&self) -> &Namespace {
        (**self).namespace()
    }

    fn find_one(&self, filter: &Document, options: &ReadOptions) -> StoreResult<Option<Document>> {
        (**self).find_one(filter, options)
    }

    fn find<'a>(
        &'a self,
        filter: &Document,
        options: &ReadOptions,
    ) -> StoreResult<DocumentCursor<'a>> {
        (**self).find(filter, options)
    }

    fn insert_one(
        &self,
        document: Document,
        options: &WriteOptions,
    ) -> StoreResult<InsertOneResult> {
        (**self).insert_one(document, options)
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateInstruction,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        (**self).update_one(filter, update, options)
    }

    fn replace_one(
        &self,
        filter: &Document,
        replacement: Document,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        (**self).replace_one(filter, replacement, options)
    }

    fn delete_one(&self, filter: &Document, options: &WriteOptions) -> StoreResult<DeleteResult> {
        (**self).delete_one(filter, options)
    }

    fn bulk_write(&self, ops: Vec<WriteOp>, options: &WriteOptions) -> StoreResult<BatchResult> {
        (**self).bulk_write(ops, options)
    }
}

impl<C: Collection + ?Sized> Collection for std::sync::Arc<C> {
    fn namespace(&self) -> &Namespace {
        (**self).namespace()
    }

    fn find_one(&self, filter: &Document, options: &ReadOptions) -> StoreResult<Option<Document>> {
        (**self).find_one(filter, options)
    }

    fn find<'a>(
        &'a self,
        filter: &Document,
        options: &ReadOptions,
    ) -> StoreResult<DocumentCursor<'a>> {
        (**self).find(filter, options)
    }

    fn insert_one(
        &self,
        document: Document,
        options: &WriteOptions,
    ) -> StoreResult<InsertOneResult> {
        (**self).insert_one(document, options)
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateInstruction,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        (**self).update_one(filter, update, options)
    }

    fn replace_one(
        &self,
        filter: &Document,
        replacement: Document,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        (**self).replace_one(filter, replacement, options)
    }

    fn delete_one(&self, filter: &Document, options: &WriteOptions) -> StoreResult<DeleteResult> {
        (**self).delete_one(filter, options)
    }

    fn bulk_write(&self, ops: Vec<WriteOp>, options: &WriteOptions) -> StoreResult<BatchResult> {
        (**self).bulk_write(ops, options)
    }
}
