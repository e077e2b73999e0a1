//! Structural diff and partial-update compilation for docwrite
//!
//! - [`PathDiff`] / [`diff`]: lazy walk of two snapshots yielding [`ChangeRecord`]s
//! - [`compile`]: folds change records into an [`UpdateInstruction`]
//! - [`diff_and_compile`]: both steps at once, `None` when no write is needed

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compile;
pub mod diff;

pub use compile::{compile, diff_and_compile, UpdateInstruction, SET_OPERATOR, UNSET_OPERATOR};
pub use diff::{
    diff, validate_field_name, Change, ChangeRecord, Differences, PathDiff, OPERATOR_PREFIX,
};
