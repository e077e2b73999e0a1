//! Logical write requests and their per-action outcome

use docwrite_core::Document;

/// A logical write, consumed once by the reconciler
#[derive(Debug, Clone, PartialEq)]
pub enum WriteAction {
    /// Insert a new document
    Create(Document),
    /// Bring the persisted `old` snapshot up to `new`
    Update {
        /// Snapshot the caller last read
        old: Document,
        /// Snapshot to persist
        new: Document,
    },
    /// Remove the persisted document
    Delete(Document),
}

impl WriteAction {
    /// Create action
    pub fn create(document: impl Into<Document>) -> Self {
        WriteAction::Create(document.into())
    }

    /// Update action
    pub fn update(old: impl Into<Document>, new: impl Into<Document>) -> Self {
        WriteAction::Update {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Delete action
    pub fn delete(document: impl Into<Document>) -> Self {
        WriteAction::Delete(document.into())
    }

    /// The document handed back to the caller once the action completes
    pub fn into_document(self) -> Document {
        match self {
            WriteAction::Create(doc) | WriteAction::Delete(doc) => doc,
            WriteAction::Update { new, .. } => new,
        }
    }
}

/// Terminal state of one logical action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionState {
    /// No-op update; nothing was submitted
    Skipped,
    /// Submitted and acknowledged by the store
    Acked,
    /// Submitted, but the store matched fewer documents than expected and
    /// the policy downgraded the failure: the local copy may no longer
    /// correspond to a persisted document
    Orphaned,
}

/// Result document of one logical action
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// The action's document, with any generated identifier backfilled
    pub document: Document,
    /// How the action ended
    pub state: ActionState,
}

impl WriteOutcome {
    /// True if the document was flagged as orphaned
    pub fn is_orphaned(&self) -> bool {
        self.state == ActionState::Orphaned
    }

    /// True if nothing was submitted for the action
    pub fn is_skipped(&self) -> bool {
        self.state == ActionState::Skipped
    }
}
