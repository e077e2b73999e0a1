//! Write policies: update mode selection and unmatched-write handling
//!
//! ## AUTO mode
//!
//! When the update mode is not pinned, a [`ModeStrategy`] decides between a
//! partial update (DIFF) and a full replace (REPLACE) for each update.
//! The default [`AutoMode`] prefers DIFF when the two snapshots are distinct
//! objects and the write either runs in a multi-document session or uses a
//! customized filter.
//!
//! This is a heuristic, not a correctness guarantee. Callers that need
//! strict behavior pin `Diff` or `Replace`.

use docwrite_core::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an update is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Let the mode strategy decide per update
    #[default]
    Auto,
    /// Diff the snapshots and send `$set` / `$unset`
    Diff,
    /// Replace the whole document
    Replace,
}

impl UpdateMode {
    /// Config spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Auto => "auto",
            UpdateMode::Diff => "diff",
            UpdateMode::Replace => "replace",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the store matches fewer documents than expected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Fail with `UnmatchedUpdate` / `UnmatchedDelete`
    #[default]
    Fail,
    /// Flag the affected documents as orphaned and carry on
    Orphan,
}

impl UnmatchedPolicy {
    /// Config spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedPolicy::Fail => "fail",
            UnmatchedPolicy::Orphan => "orphan",
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy applied to every write of an adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Update mode
    pub mode: UpdateMode,
    /// Handling of updates and replaces that matched nothing
    pub on_unmatched_update: UnmatchedPolicy,
    /// Handling of deletes that removed nothing
    pub on_unmatched_delete: UnmatchedPolicy,
}

impl ReconcilePolicy {
    /// Strict policy with a pinned mode
    pub fn with_mode(mode: UpdateMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Orphan instead of failing, for both updates and deletes
    pub fn allow_lost_writes(mut self) -> Self {
        self.on_unmatched_update = UnmatchedPolicy::Orphan;
        self.on_unmatched_delete = UnmatchedPolicy::Orphan;
        self
    }

    /// Resolve the mode for one update: never returns `Auto`
    pub fn resolve_mode(&self, strategy: &dyn ModeStrategy, ctx: &ModeContext<'_>) -> UpdateMode {
        match self.mode {
            UpdateMode::Auto => {
                if strategy.prefer_diff(ctx) {
                    UpdateMode::Diff
                } else {
                    UpdateMode::Replace
                }
            }
            pinned => pinned,
        }
    }
}

/// What a mode strategy gets to look at
#[derive(Debug, Clone, Copy)]
pub struct ModeContext<'a> {
    /// Snapshot the caller last read
    pub old: &'a Document,
    /// Snapshot to persist
    pub new: &'a Document,
    /// The write runs in a multi-document session
    pub in_session: bool,
    /// The identifying filter is not the default identifier filter
    pub custom_filter: bool,
}

/// Pluggable AUTO-mode predicate
///
/// Any `Fn(&ModeContext) -> bool` closure is a strategy.
pub trait ModeStrategy: Send + Sync {
    /// True to write the update as a diff, false to replace the document
    fn prefer_diff(&self, ctx: &ModeContext<'_>) -> bool;
}

impl<F> ModeStrategy for F
where
    F: Fn(&ModeContext<'_>) -> bool + Send + Sync,
{
    fn prefer_diff(&self, ctx: &ModeContext<'_>) -> bool {
        self(ctx)
    }
}

/// Default AUTO heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoMode;

impl ModeStrategy for AutoMode {
    fn prefer_diff(&self, ctx: &ModeContext<'_>) -> bool {
        !std::ptr::eq(ctx.old, ctx.new) && (ctx.in_session || ctx.custom_filter)
    }
}
