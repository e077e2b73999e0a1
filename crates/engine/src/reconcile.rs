//! Batch write reconciliation
//!
//! [`WriteReconciler::reconcile`] turns logical [`WriteAction`]s into one
//! batch of physical [`WriteOp`]s, submits it in a single store call and maps
//! the store's answer back onto the actions.
//!
//! ## Per-action translation
//!
//! | Action | Physical op |
//! |--------|-------------|
//! | CREATE | insertOne with the sanitized document |
//! | UPDATE, DIFF mode | updateOne with the compiled instruction, or nothing for a no-op |
//! | UPDATE, REPLACE mode | replaceOne with the sanitized new document |
//! | DELETE | deleteOne keyed by the identifying filter |
//!
//! No-op updates are dropped from the batch, so logical and physical indices
//! diverge. [`OpIndex`] records the (logical, physical) pairs before
//! submission; every index the store reports is translated through it.
//!
//! ## Action lifecycle
//!
//! ```text
//! PENDING -> SKIPPED                      (no-op update)
//!         -> SUBMITTED -> ACKED
//!                      -> UNMATCHED -> ORPHANED   (policy: orphan)
//!                      -> UNMATCHED -> FAILED     (policy: fail)
//! ```
//!
//! Nothing is retried here.

use crate::action::{ActionState, WriteAction, WriteOutcome};
use crate::filter::FilterStrategy;
use crate::ops::{BatchResult, OpKind, WriteOp};
use crate::options::WriteOptions;
use crate::policy::{
    AutoMode, ModeContext, ModeStrategy, ReconcilePolicy, UnmatchedPolicy, UpdateMode,
};
use crate::store::Collection;
use docwrite_core::{sanitized_copy, Document, Error, Namespace, Result, UnmatchedWrite};
use docwrite_diff::diff_and_compile;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// Write Settings
// =============================================================================

/// Everything that shapes how actions become physical operations
#[derive(Clone)]
pub struct WriteSettings {
    /// Mode and unmatched-write handling
    pub policy: ReconcilePolicy,
    /// Identifying filter builder
    pub filter: FilterStrategy,
    /// AUTO-mode predicate
    pub mode_strategy: Arc<dyn ModeStrategy>,
    /// Upsert every update and replace, in addition to per-call options
    pub upsert: bool,
}

impl Default for WriteSettings {
    fn default() -> Self {
        Self {
            policy: ReconcilePolicy::default(),
            filter: FilterStrategy::default(),
            mode_strategy: Arc::new(AutoMode),
            upsert: false,
        }
    }
}

impl fmt::Debug for WriteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSettings")
            .field("policy", &self.policy)
            .field("filter", &self.filter)
            .field("upsert", &self.upsert)
            .finish_non_exhaustive()
    }
}

impl WriteSettings {
    /// Replace the policy
    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the filter strategy
    pub fn with_filter(mut self, filter: FilterStrategy) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the AUTO-mode predicate
    pub fn with_mode_strategy(mut self, strategy: impl ModeStrategy + 'static) -> Self {
        self.mode_strategy = Arc::new(strategy);
        self
    }

    /// Upsert by default
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Translate one action, None when nothing needs to be written
    ///
    /// # Errors
    ///
    /// Validation errors only: `InvalidDocument`, `InvalidFieldName`,
    /// `EmptyPath`. Nothing here talks to the store.
    pub fn plan(&self, action: &WriteAction, options: &WriteOptions) -> Result<Option<WriteOp>> {
        match action {
            WriteAction::Create(document) => self.plan_create(document).map(Some),
            WriteAction::Update { old, new } => self.plan_update(old, new, options),
            WriteAction::Delete(document) => self.plan_delete(document).map(Some),
        }
    }

    /// Translate an insert of `document`
    pub fn plan_create(&self, document: &Document) -> Result<WriteOp> {
        require_object(document, "create")?;
        Ok(WriteOp::InsertOne {
            document: sanitized_copy(document),
        })
    }

    /// Translate a delete of `document`
    pub fn plan_delete(&self, document: &Document) -> Result<WriteOp> {
        require_object(document, "delete")?;
        Ok(WriteOp::DeleteOne {
            filter: self.filter.filter_for(document)?,
        })
    }

    /// Translate an update of `old` into `new`
    pub fn plan_update(
        &self,
        old: &Document,
        new: &Document,
        options: &WriteOptions,
    ) -> Result<Option<WriteOp>> {
        require_object(old, "update")?;
        require_object(new, "update")?;
        let filter = self.filter.filter_for(old)?;
        let upsert = options.upsert || self.upsert;

        let ctx = ModeContext {
            old,
            new,
            in_session: options.in_session(),
            custom_filter: self.filter.is_customized(),
        };
        match self.policy.resolve_mode(self.mode_strategy.as_ref(), &ctx) {
            UpdateMode::Diff => Ok(diff_and_compile(old, new)?.map(|update| WriteOp::UpdateOne {
                filter,
                update,
                upsert,
            })),
            _ => Ok(Some(WriteOp::ReplaceOne {
                filter,
                replacement: sanitized_copy(new),
                upsert,
            })),
        }
    }
}

fn require_object(document: &Document, action: &str) -> Result<()> {
    if document.is_object() {
        Ok(())
    } else {
        Err(Error::invalid_document(format!(
            "{} expects an object document, got {}",
            action,
            document.type_name()
        )))
    }
}

// =============================================================================
// Index Table
// =============================================================================

/// Ordered (logical action index, physical operation index) pairs
///
/// Both columns increase strictly, so lookups in either direction are
/// binary searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpIndex {
    entries: Vec<(usize, usize)>,
}

impl OpIndex {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `logical` was submitted as operation `physical`
    pub fn push(&mut self, logical: usize, physical: usize) {
        debug_assert!(self.entries.last().map_or(true, |&(l, p)| l < logical && p < physical));
        self.entries.push((logical, physical));
    }

    /// Number of submitted operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Action that produced operation `physical`
    pub fn logical_for(&self, physical: usize) -> Option<usize> {
        self.entries
            .binary_search_by_key(&physical, |&(_, p)| p)
            .ok()
            .map(|pos| self.entries[pos].0)
    }

    /// Operation submitted for action `logical`, None if it was skipped
    pub fn physical_for(&self, logical: usize) -> Option<usize> {
        self.entries
            .binary_search_by_key(&logical, |&(l, _)| l)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    /// Pairs in submission order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().copied()
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Batch writer over one collection
pub struct WriteReconciler<'a, C: Collection + ?Sized> {
    collection: &'a C,
    settings: &'a WriteSettings,
}

impl<'a, C: Collection + ?Sized> WriteReconciler<'a, C> {
    /// Reconciler writing to `collection`
    pub fn new(collection: &'a C, settings: &'a WriteSettings) -> Self {
        Self {
            collection,
            settings,
        }
    }

    /// Write every action in one batch and return one outcome per action,
    /// in action order
    ///
    /// All actions are validated before anything is sent. When every action
    /// turns out to be a no-op, the store is not called at all.
    ///
    /// # Errors
    ///
    /// - Validation errors, before any store call
    /// - `Store`, unchanged from the store
    /// - `UnsupportedOperation` if the result names an operation that could
    ///   not have produced it
    /// - `UnmatchedUpdate` / `UnmatchedDelete` under the `Fail` policy, after
    ///   the batch was applied and before identifiers are backfilled
    pub fn reconcile(
        &self,
        actions: Vec<WriteAction>,
        options: &WriteOptions,
    ) -> Result<Vec<WriteOutcome>> {
        let namespace = self.collection.namespace();

        let mut ops = Vec::with_capacity(actions.len());
        let mut index = OpIndex::new();
        for (logical, action) in actions.iter().enumerate() {
            match self.settings.plan(action, options)? {
                Some(op) => {
                    index.push(logical, ops.len());
                    ops.push(op);
                }
                None => {
                    debug!(
                        target: "docwrite::reconcile",
                        %namespace,
                        logical,
                        "Skipping no-op update"
                    );
                }
            }
        }

        let mut states = vec![ActionState::Skipped; actions.len()];
        let mut documents: Vec<Document> =
            actions.into_iter().map(WriteAction::into_document).collect();

        if ops.is_empty() {
            debug!(target: "docwrite::reconcile", %namespace, "Nothing to write");
            return Ok(outcomes(documents, states));
        }

        let shapes: Vec<(OpKind, bool)> =
            ops.iter().map(|op| (op.kind(), op.is_upsert())).collect();
        debug!(
            target: "docwrite::reconcile",
            %namespace,
            ops = ops.len(),
            skipped = documents.len() - ops.len(),
            "Submitting batch"
        );
        let result = self.collection.bulk_write(ops, options)?;
        check_result_shape(&result, &shapes)?;

        for (logical, _) in index.iter() {
            states[logical] = ActionState::Acked;
        }

        let expected_updates = shapes.iter().filter(|(kind, _)| kind.is_update()).count() as u64;
        let observed_updates = result.acknowledged_updates();
        if expected_updates != observed_updates {
            let unmatched = unmatched_write(namespace, expected_updates, observed_updates);
            match self.settings.policy.on_unmatched_update {
                UnmatchedPolicy::Fail => return Err(Error::UnmatchedUpdate(Box::new(unmatched))),
                UnmatchedPolicy::Orphan => {
                    warn!(
                        target: "docwrite::reconcile",
                        %unmatched,
                        "Flagging updated documents as orphaned"
                    );
                    for (logical, physical) in index.iter() {
                        let upserted = result.upserted_ids.contains_key(&physical);
                        if shapes[physical].0.is_update() && !upserted {
                            states[logical] = ActionState::Orphaned;
                        }
                    }
                }
            }
        }

        let expected_deletes =
            shapes.iter().filter(|(kind, _)| *kind == OpKind::Delete).count() as u64;
        if expected_deletes != result.deleted_count {
            let unmatched = unmatched_write(namespace, expected_deletes, result.deleted_count);
            match self.settings.policy.on_unmatched_delete {
                UnmatchedPolicy::Fail => return Err(Error::UnmatchedDelete(Box::new(unmatched))),
                UnmatchedPolicy::Orphan => {
                    warn!(
                        target: "docwrite::reconcile",
                        %unmatched,
                        "Flagging deleted documents as orphaned"
                    );
                    for (logical, physical) in index.iter() {
                        if shapes[physical].0 == OpKind::Delete {
                            states[logical] = ActionState::Orphaned;
                        }
                    }
                }
            }
        }

        for (physical, id) in result.inserted_ids.into_iter().chain(result.upserted_ids) {
            let logical = index
                .logical_for(physical)
                .ok_or_else(|| unsupported(physical, "no action was submitted at this index"))?;
            documents[logical].set_id(id);
        }

        Ok(outcomes(documents, states))
    }
}

/// Reject results that reference operations which cannot have produced them
fn check_result_shape(result: &BatchResult, shapes: &[(OpKind, bool)]) -> Result<()> {
    for &physical in result.inserted_ids.keys() {
        match shapes.get(physical) {
            Some((OpKind::Insert, _)) => {}
            Some((kind, _)) => {
                let reason = format!("inserted id reported for {}", kind);
                return Err(unsupported(physical, reason));
            }
            None => {
                let reason = "inserted id reported past the end of the batch";
                return Err(unsupported(physical, reason));
            }
        }
    }
    for &physical in result.upserted_ids.keys() {
        match shapes.get(physical) {
            Some((kind, true)) if kind.is_update() => {}
            Some((kind, _)) => {
                let reason = format!("upserted id reported for {}", kind);
                return Err(unsupported(physical, reason));
            }
            None => {
                let reason = "upserted id reported past the end of the batch";
                return Err(unsupported(physical, reason));
            }
        }
    }
    Ok(())
}

fn unsupported(index: usize, reason: impl Into<String>) -> Error {
    Error::UnsupportedOperation {
        index,
        reason: reason.into(),
    }
}

fn unmatched_write(namespace: &Namespace, expected: u64, observed: u64) -> UnmatchedWrite {
    UnmatchedWrite {
        namespace: namespace.clone(),
        expected,
        observed,
        filter: None,
        id: None,
    }
}

fn outcomes(documents: Vec<Document>, states: Vec<ActionState>) -> Vec<WriteOutcome> {
    documents
        .into_iter()
        .zip(states)
        .map(|(document, state)| WriteOutcome { document, state })
        .collect()
}
