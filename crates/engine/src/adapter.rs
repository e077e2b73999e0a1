//! Single-document adapter over a collection
//!
//! `CollectionAdapter` is the store-facing surface: reads, one-document
//! writes and batches. Each single-document call issues at most one store
//! operation; an update that diffs to nothing issues none.

use crate::action::{ActionState, WriteAction, WriteOutcome};
use crate::config::AdapterConfig;
use crate::filter::FilterStrategy;
use crate::ops::{DeleteResult, UpdateResult, WriteOp};
use crate::options::{ReadOptions, WriteOptions};
use crate::policy::{ModeStrategy, ReconcilePolicy, UnmatchedPolicy};
use crate::reconcile::{WriteReconciler, WriteSettings};
use crate::store::Collection;
use docwrite_core::{Document, Error, Result, UnmatchedWrite};
use tracing::{debug, warn};

/// Lazy sequence of documents read through the adapter
pub type Documents<'a> = Box<dyn Iterator<Item = Result<Document>> + Send + 'a>;

/// What a single physical operation reported
enum Submitted {
    Inserted(Document),
    Updated(UpdateResult),
    Deleted(DeleteResult),
}

/// Document writes against one collection, under one set of write settings
pub struct CollectionAdapter<C: Collection> {
    collection: C,
    settings: WriteSettings,
}

impl<C: Collection> CollectionAdapter<C> {
    /// Adapter with default settings: AUTO mode, strict unmatched handling,
    /// identifier filters
    pub fn new(collection: C) -> Self {
        Self::with_settings(collection, WriteSettings::default())
    }

    /// Adapter with explicit settings
    pub fn with_settings(collection: C, settings: WriteSettings) -> Self {
        Self { collection, settings }
    }

    /// Adapter configured from an [`AdapterConfig`]
    ///
    /// # Errors
    ///
    /// `Config` if the configuration holds an invalid value.
    pub fn from_config(collection: C, config: &AdapterConfig) -> Result<Self> {
        Ok(Self::with_settings(collection, config.to_settings()?))
    }

    /// Replace the policy
    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.settings.policy = policy;
        self
    }

    /// Replace the filter strategy
    pub fn with_filter(mut self, filter: FilterStrategy) -> Self {
        self.settings.filter = filter;
        self
    }

    /// Replace the AUTO-mode predicate
    pub fn with_mode_strategy(mut self, strategy: impl ModeStrategy + 'static) -> Self {
        self.settings = self.settings.with_mode_strategy(strategy);
        self
    }

    /// Name of the adapter, `Store@database:collection`
    pub fn name(&self) -> String {
        self.collection.namespace().adapter_name()
    }

    /// The wrapped collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Active write settings
    pub fn settings(&self) -> &WriteSettings {
        &self.settings
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// First document matching `filter`
    pub fn find(&self, filter: &Document, options: &ReadOptions) -> Result<Option<Document>> {
        Ok(self.collection.find_one(filter, options)?)
    }

    /// Every document matching `filter`, read lazily from one store cursor
    pub fn filter(&self, filter: &Document, options: &ReadOptions) -> Result<Documents<'_>> {
        let cursor = self.collection.find(filter, options)?;
        Ok(Box::new(cursor.map(|doc| doc.map_err(Error::from))))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert `document`, returning it with the store-generated identifier
    pub fn create(&self, mut document: Document, options: &WriteOptions) -> Result<Document> {
        let op = self.settings.plan_create(&document)?;
        match self.submit(op, options)? {
            Submitted::Inserted(id) => {
                document.set_id(id);
                Ok(document)
            }
            _ => Err(unexpected_result("insertOne")),
        }
    }

    /// Bring the persisted copy of `old` up to `new`
    ///
    /// In DIFF mode a no-op update makes no store call and comes back
    /// `Skipped`. An upserted identifier is backfilled onto the returned
    /// document.
    ///
    /// # Errors
    ///
    /// `UnmatchedUpdate` when nothing matched and the policy is `Fail`.
    pub fn update(
        &self,
        old: &Document,
        new: &Document,
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        let namespace = self.collection.namespace();
        let op = match self.settings.plan_update(old, new, options)? {
            Some(op) => op,
            None => {
                debug!(target: "docwrite::adapter", %namespace, "Skipping no-op update");
                return Ok(WriteOutcome {
                    document: new.clone(),
                    state: ActionState::Skipped,
                });
            }
        };

        let filter = op.filter().cloned();
        let kind = op.kind();
        let result = match self.submit(op, options)? {
            Submitted::Updated(result) => result,
            _ => return Err(unexpected_result(kind.as_str())),
        };

        let mut document = new.clone();
        let mut state = ActionState::Acked;
        if result.acknowledged() != 1 {
            let unmatched = UnmatchedWrite {
                namespace: namespace.clone(),
                expected: 1,
                observed: result.acknowledged(),
                filter,
                id: old.id().cloned(),
            };
            match self.settings.policy.on_unmatched_update {
                UnmatchedPolicy::Fail => return Err(Error::UnmatchedUpdate(Box::new(unmatched))),
                UnmatchedPolicy::Orphan => {
                    warn!(
                        target: "docwrite::adapter",
                        %unmatched,
                        "Flagging updated document as orphaned"
                    );
                    state = ActionState::Orphaned;
                }
            }
        }
        if let Some(id) = result.upserted_id {
            document.set_id(id);
        }
        Ok(WriteOutcome { document, state })
    }

    /// Delete the persisted copy of `document`
    ///
    /// # Errors
    ///
    /// `UnmatchedDelete` when nothing was deleted and the policy is `Fail`.
    pub fn delete(&self, document: Document, options: &WriteOptions) -> Result<WriteOutcome> {
        let op = self.settings.plan_delete(&document)?;
        let filter = op.filter().cloned();
        let result = match self.submit(op, options)? {
            Submitted::Deleted(result) => result,
            _ => return Err(unexpected_result("deleteOne")),
        };

        let mut state = ActionState::Acked;
        if result.deleted_count != 1 {
            let unmatched = UnmatchedWrite {
                namespace: self.collection.namespace().clone(),
                expected: 1,
                observed: result.deleted_count,
                filter,
                id: document.id().cloned(),
            };
            match self.settings.policy.on_unmatched_delete {
                UnmatchedPolicy::Fail => return Err(Error::UnmatchedDelete(Box::new(unmatched))),
                UnmatchedPolicy::Orphan => {
                    warn!(
                        target: "docwrite::adapter",
                        %unmatched,
                        "Flagging deleted document as orphaned"
                    );
                    state = ActionState::Orphaned;
                }
            }
        }
        Ok(WriteOutcome { document, state })
    }

    /// Write a batch of actions in one store call, see [`WriteReconciler::reconcile`]
    pub fn bulk(
        &self,
        actions: Vec<WriteAction>,
        options: &WriteOptions,
    ) -> Result<Vec<WriteOutcome>> {
        WriteReconciler::new(&self.collection, &self.settings).reconcile(actions, options)
    }

    /// Issue one physical operation through the matching single-document call
    fn submit(&self, op: WriteOp, options: &WriteOptions) -> Result<Submitted> {
        let namespace = self.collection.namespace();
        debug!(target: "docwrite::adapter", %namespace, op = %op.kind(), "Submitting");
        let submitted = match op {
            WriteOp::InsertOne { document } => {
                Submitted::Inserted(self.collection.insert_one(document, options)?.inserted_id)
            }
            WriteOp::UpdateOne { filter, update, upsert } => {
                let options = with_upsert(options, upsert);
                Submitted::Updated(self.collection.update_one(&filter, &update, &options)?)
            }
            WriteOp::ReplaceOne {
                filter,
                replacement,
                upsert,
            } => {
                let options = with_upsert(options, upsert);
                Submitted::Updated(self.collection.replace_one(&filter, replacement, &options)?)
            }
            WriteOp::DeleteOne { filter } => {
                Submitted::Deleted(self.collection.delete_one(&filter, options)?)
            }
        };
        Ok(submitted)
    }
}

fn with_upsert(options: &WriteOptions, upsert: bool) -> WriteOptions {
    WriteOptions {
        upsert,
        session: options.session.clone(),
    }
}

fn unexpected_result(op: &str) -> Error {
    Error::UnsupportedOperation {
        index: 0,
        reason: format!("store answered {} with a result of another kind", op),
    }
}
