//! In-memory reference collection
//!
//! A `Collection` backed by a `Vec` behind a `RwLock`. Filters are equality
//! matches on dotted paths, where a null filter value also matches a missing
//! field. Batches run in order and stop at the first failure without rolling
//! back earlier operations.
//!
//! Every call is recorded so tests can assert how many round-trips a write
//! took, and a one-shot failure can be injected with [`MemoryCollection::fail_next`].

use crate::ops::{BatchResult, DeleteResult, InsertOneResult, UpdateResult, WriteOp};
use crate::options::{ReadOptions, WriteOptions};
use crate::store::{Collection, DocumentCursor, StoreResult};
use docwrite_core::{get_at_path, DocId, DocPath, Document, Namespace, StoreError, ID_FIELD};
use docwrite_diff::UpdateInstruction;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Collection held entirely in memory
pub struct MemoryCollection {
    namespace: Namespace,
    documents: RwLock<Vec<Document>>,
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<String>>,
}

impl MemoryCollection {
    /// Empty collection
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            documents: RwLock::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Collection pre-filled with `documents`, without recording calls
    pub fn with_documents(namespace: Namespace, documents: Vec<Document>) -> Self {
        let collection = Self::new(namespace);
        *collection.documents.write() = documents;
        collection
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Copy of every stored document, in insertion order
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    /// Stored document with identifier `id`
    pub fn get(&self, id: &Document) -> Option<Document> {
        self.documents
            .read()
            .iter()
            .find(|doc| doc.id() == Some(id))
            .cloned()
    }

    /// Remove a document behind the adapter's back, as a concurrent writer would
    pub fn remove(&self, id: &Document) -> Option<Document> {
        let mut documents = self.documents.write();
        let pos = documents.iter().position(|doc| doc.id() == Some(id))?;
        Some(documents.remove(pos))
    }

    /// Store methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// Make the next store call fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    fn enter(&self, method: &'static str) -> StoreResult<()> {
        self.calls.lock().push(method);
        match self.fail_next.lock().take() {
            Some(message) => Err(StoreError::new(message)),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Operations on the locked document list
    // =========================================================================

    fn insert_locked(
        documents: &mut Vec<Document>,
        mut document: Document,
    ) -> StoreResult<Document> {
        if !document.is_object() {
            return Err(StoreError::new(format!(
                "cannot insert a {} as a document",
                document.type_name()
            )));
        }
        let id = match document.id() {
            Some(id) => id.clone(),
            None => {
                let id = Document::from(DocId::new());
                document.set_id(id.clone());
                id
            }
        };
        if documents.iter().any(|doc| doc.id() == Some(&id)) {
            return Err(StoreError::new(format!("duplicate key: {} = {}", ID_FIELD, id)));
        }
        documents.push(document);
        Ok(id)
    }

    fn update_locked(
        documents: &mut Vec<Document>,
        filter: &Document,
        update: &UpdateInstruction,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        match position(documents, filter)? {
            Some(pos) => {
                let mut updated = documents[pos].clone();
                apply(&mut updated, update)?;
                if updated.id() != documents[pos].id() {
                    return Err(StoreError::new(format!("field '{}' is immutable", ID_FIELD)));
                }
                let modified = updated != documents[pos];
                documents[pos] = updated;
                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            }
            None if upsert => {
                let mut seeded = seed_from_filter(filter)?;
                apply(&mut seeded, update)?;
                let id = Self::insert_locked(documents, seeded)?;
                Ok(UpdateResult {
                    upserted_id: Some(id),
                    ..Default::default()
                })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    fn replace_locked(
        documents: &mut Vec<Document>,
        filter: &Document,
        mut replacement: Document,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        if !replacement.is_object() {
            return Err(StoreError::new("replacement must be a document"));
        }
        match position(documents, filter)? {
            Some(pos) => {
                let existing_id = documents[pos].id().cloned();
                match (replacement.id(), existing_id) {
                    (Some(new_id), Some(old_id)) if *new_id != old_id => {
                        return Err(StoreError::new(format!("field '{}' is immutable", ID_FIELD)));
                    }
                    (None, Some(old_id)) => replacement.set_id(old_id),
                    _ => {}
                }
                let modified = replacement != documents[pos];
                documents[pos] = replacement;
                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            }
            None if upsert => {
                if replacement.id().is_none() {
                    if let Some(id) = filter.id() {
                        replacement.set_id(id.clone());
                    }
                }
                let id = Self::insert_locked(documents, replacement)?;
                Ok(UpdateResult {
                    upserted_id: Some(id),
                    ..Default::default()
                })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    fn delete_locked(
        documents: &mut Vec<Document>,
        filter: &Document,
    ) -> StoreResult<DeleteResult> {
        match position(documents, filter)? {
            Some(pos) => {
                documents.remove(pos);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }
}

impl Collection for MemoryCollection {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn find_one(&self, filter: &Document, _options: &ReadOptions) -> StoreResult<Option<Document>> {
        self.enter("findOne")?;
        let documents = self.documents.read();
        Ok(position(&documents, filter)?.map(|pos| documents[pos].clone()))
    }

    fn find<'a>(
        &'a self,
        filter: &Document,
        _options: &ReadOptions,
    ) -> StoreResult<DocumentCursor<'a>> {
        self.enter("find")?;
        let documents = self.documents.read();
        let mut matched = Vec::new();
        for doc in documents.iter() {
            if matches_filter(doc, filter)? {
                matched.push(doc.clone());
            }
        }
        Ok(Box::new(matched.into_iter().map(Ok)))
    }

    fn insert_one(
        &self,
        document: Document,
        _options: &WriteOptions,
    ) -> StoreResult<InsertOneResult> {
        self.enter("insertOne")?;
        let inserted_id = Self::insert_locked(&mut self.documents.write(), document)?;
        Ok(InsertOneResult { inserted_id })
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &UpdateInstruction,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        self.enter("updateOne")?;
        Self::update_locked(&mut self.documents.write(), filter, update, options.upsert)
    }

    fn replace_one(
        &self,
        filter: &Document,
        replacement: Document,
        options: &WriteOptions,
    ) -> StoreResult<UpdateResult> {
        self.enter("replaceOne")?;
        Self::replace_locked(&mut self.documents.write(), filter, replacement, options.upsert)
    }

    fn delete_one(&self, filter: &Document, _options: &WriteOptions) -> StoreResult<DeleteResult> {
        self.enter("deleteOne")?;
        Self::delete_locked(&mut self.documents.write(), filter)
    }

    fn bulk_write(&self, ops: Vec<WriteOp>, _options: &WriteOptions) -> StoreResult<BatchResult> {
        self.enter("bulkWrite")?;
        debug!(
            target: "docwrite::memory",
            namespace = %self.namespace,
            ops = ops.len(),
            "Applying batch"
        );

        let mut documents = self.documents.write();
        let mut result = BatchResult::default();
        for (index, op) in ops.into_iter().enumerate() {
            match op {
                WriteOp::InsertOne { document } => {
                    let id = Self::insert_locked(&mut documents, document)?;
                    result.inserted_ids.insert(index, id);
                }
                WriteOp::UpdateOne { filter, update, upsert } => {
                    let outcome = Self::update_locked(&mut documents, &filter, &update, upsert)?;
                    tally(&mut result, index, outcome);
                }
                WriteOp::ReplaceOne {
                    filter,
                    replacement,
                    upsert,
                } => {
                    let outcome =
                        Self::replace_locked(&mut documents, &filter, replacement, upsert)?;
                    tally(&mut result, index, outcome);
                }
                WriteOp::DeleteOne { filter } => {
                    let outcome = Self::delete_locked(&mut documents, &filter)?;
                    result.deleted_count += outcome.deleted_count;
                }
            }
        }
        Ok(result)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn tally(result: &mut BatchResult, index: usize, outcome: UpdateResult) {
    result.matched_count += outcome.matched_count;
    result.modified_count += outcome.modified_count;
    if let Some(id) = outcome.upserted_id {
        result.upserted_ids.insert(index, id);
    }
}

fn position(documents: &[Document], filter: &Document) -> StoreResult<Option<usize>> {
    for (pos, doc) in documents.iter().enumerate() {
        if matches_filter(doc, filter)? {
            return Ok(Some(pos));
        }
    }
    Ok(None)
}

/// Equality match of every filter field; null also matches a missing field
fn matches_filter(doc: &Document, filter: &Document) -> StoreResult<bool> {
    let fields = filter
        .as_object()
        .ok_or_else(|| {
            StoreError::new(format!(
                "filter must be a document, got {}",
                filter.type_name()
            ))
        })?;
    for (key, expected) in fields {
        if key.starts_with('$') {
            return Err(StoreError::new(format!("unsupported filter operator '{}'", key)));
        }
        let path = parse_path(key)?;
        let matched = match get_at_path(doc, &path) {
            Some(actual) => actual == expected,
            None => expected.is_null() || expected.is_absent(),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Document an upsert starts from: the filter's equality fields
fn seed_from_filter(filter: &Document) -> StoreResult<Document> {
    let mut seeded = Document::object();
    if let Some(fields) = filter.as_object() {
        for (key, value) in fields {
            let path = parse_path(key)?;
            docwrite_core::set_at_path(&mut seeded, &path, value.clone())
                .map_err(|e| StoreError::with_source("cannot seed upsert from filter", e))?;
        }
    }
    Ok(seeded)
}

fn apply(document: &mut Document, update: &UpdateInstruction) -> StoreResult<()> {
    update
        .apply_to(document)
        .map_err(|e| StoreError::with_source("cannot apply update", e))
}

fn parse_path(key: &str) -> StoreResult<DocPath> {
    key.parse()
        .map_err(|e| StoreError::with_source(format!("invalid path '{}'", key), e))
}
