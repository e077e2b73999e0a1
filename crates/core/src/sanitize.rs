//! Absent-marker stripping
//!
//! Stores have no notion of an "absent" field, so every value tree that
//! leaves this crate for a store (a whole document to insert or replace,
//! or a value embedded in a `$set`) goes through the sanitizer first.
//!
//! - Object fields holding `Absent` are removed
//! - Array elements that are `Absent` are removed
//! - Scalars pass through unchanged; `Null` is kept
//!
//! Sanitizing is idempotent.

use crate::document::Document;

/// Strip absent markers, consuming the value
///
/// # Examples
///
/// ```
/// use docwrite_core::{sanitize, Document};
///
/// let doc = Document::object()
///     .with("a", 1)
///     .with("b", Document::object().with("c", Document::Absent).with("d", 2));
///
/// let clean = sanitize(doc);
/// assert_eq!(
///     clean,
///     Document::object().with("a", 1).with("b", Document::object().with("d", 2))
/// );
/// ```
pub fn sanitize(mut value: Document) -> Document {
    sanitize_in_place(&mut value);
    value
}

/// Strip absent markers in place
pub fn sanitize_in_place(value: &mut Document) {
    match value {
        Document::Object(fields) => {
            fields.retain(|_, v| !v.is_absent());
            for v in fields.values_mut() {
                sanitize_in_place(v);
            }
        }
        Document::Array(items) => {
            items.retain(|item| !item.is_absent());
            for item in items.iter_mut() {
                sanitize_in_place(item);
            }
        }
        _ => {}
    }
}

/// Sanitized deep copy of a borrowed value
///
/// Absent subtrees are skipped instead of being cloned and then dropped.
pub fn sanitized_copy(value: &Document) -> Document {
    match value {
        Document::Object(fields) => Document::Object(
            fields
                .iter()
                .filter(|(_, v)| !v.is_absent())
                .map(|(k, v)| (k.clone(), sanitized_copy(v)))
                .collect(),
        ),
        Document::Array(items) => Document::Array(
            items
                .iter()
                .filter(|item| !item.is_absent())
                .map(sanitized_copy)
                .collect(),
        ),
        other => other.clone(),
    }
}

/// True when the tree carries no absent marker below its root
pub fn is_sanitized(value: &Document) -> bool {
    match value {
        Document::Object(fields) => fields.values().all(|v| !v.is_absent() && is_sanitized(v)),
        Document::Array(items) => items.iter().all(|item| !item.is_absent() && is_sanitized(item)),
        _ => true,
    }
}
