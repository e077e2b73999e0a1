//! Paths into a document
//!
//! This module defines:
//! - PathSegment: Individual path component (Key or Index)
//! - DocPath: Ordered list of segments, rendered as a dotted path (`items.0.name`)
//! - Path operations: `get_at_path`, `set_at_path`, `unset_at_path`
//!
//! # Dotted Paths
//!
//! A dotted path joins segments with `.`; array indices render as plain
//! numbers. This is the addressing scheme a store's partial-update mechanism
//! accepts, so the rendering is lossy on purpose: a key `"0"` and the index
//! `0` print the same. When a dotted path is parsed back, all-digit segments
//! become indices, and the mutation helpers treat an index that lands on an
//! object as a field name, which is how document stores resolve the same
//! ambiguity.

use crate::document::{Document, Fields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between dotted path segments
pub const PATH_SEPARATOR: char = '.';

/// Most null elements a single write may pad an array with
pub const MAX_ARRAY_PADDING: usize = 1_500_000;

/// Error type for path parsing and path mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Empty segment in a dotted path
    #[error("empty segment in path at position {0}")]
    EmptySegment(usize),

    /// The root path cannot be the target of a field-level write
    #[error("the document root cannot be addressed by a field path")]
    RootPath,

    /// A scalar sits where the path needs to descend
    #[error("cannot traverse {found} at '{path}'")]
    NotTraversable {
        /// Dotted path of the offending node
        path: String,
        /// Type name of the offending node
        found: &'static str,
    },

    /// An index too far past the end of the array it writes into
    #[error("index {index} at '{path}' is too far past the end of an array of length {len}")]
    IndexOutOfRange {
        /// Dotted path of the array
        path: String,
        /// Requested index
        index: usize,
        /// Current array length
        len: usize,
    },
}

/// A segment in a document path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object field name
    Key(String),
    /// Array position
    Index(usize),
}

impl PathSegment {
    /// Field-name view of this segment (indices print as numbers)
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(k) => k.clone(),
            PathSegment::Index(i) => i.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A path into a document
///
/// The empty path is the document root. A root path can appear while
/// diffing but never as a key of an update instruction.
///
/// # Examples
///
/// ```
/// use docwrite_core::path::DocPath;
///
/// let path = DocPath::root().key("items").index(0).key("name");
/// assert_eq!(path.to_dotted(), "items.0.name");
///
/// let parsed: DocPath = "items.0.name".parse().unwrap();
/// assert_eq!(parsed, path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        DocPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        DocPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Get the number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// A new path extended by one segment, leaving `self` untouched
    pub fn child(&self, segment: PathSegment) -> DocPath {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        DocPath { segments }
    }

    /// Check if this path is an ancestor of another (or equal)
    pub fn is_ancestor_of(&self, other: &DocPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Render as a dotted path (`a.0.b`); the root renders as `""`
    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(PATH_SEPARATOR);
            }
            match seg {
                PathSegment::Key(k) => out.push_str(k),
                PathSegment::Index(idx) => out.push_str(&idx.to_string()),
            }
        }
        out
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    /// Parse a dotted path; all-digit segments become indices
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(DocPath::root());
        }

        let mut segments = Vec::new();
        let mut position = 0;
        for part in s.split(PATH_SEPARATOR) {
            if part.is_empty() {
                return Err(PathError::EmptySegment(position));
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                match part.parse::<usize>() {
                    Ok(idx) => PathSegment::Index(idx),
                    Err(_) => PathSegment::Key(part.to_string()),
                }
            } else {
                PathSegment::Key(part.to_string())
            };
            segments.push(segment);
            position += part.len() + 1;
        }

        Ok(DocPath { segments })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

// =============================================================================
// Path Operations
// =============================================================================

/// Get the value at a path, None if the path does not resolve
///
/// Absent values resolve to None as well.
pub fn get_at_path<'a>(root: &'a Document, path: &DocPath) -> Option<&'a Document> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (Document::Object(fields), seg) => fields.get(&seg.as_key())?,
            (Document::Array(items), PathSegment::Index(idx)) => items.get(*idx)?,
            _ => return None,
        };
    }
    if current.is_absent() {
        None
    } else {
        Some(current)
    }
}

/// Set the value at a path, the way a `$set` applies it
///
/// - Missing (or absent) intermediate nodes are created as objects
/// - An index past the end of an array pads the gap with nulls
/// - An index landing on an object is used as a field name
///
/// # Errors
///
/// `RootPath` for the empty path, `NotTraversable` when a scalar sits on
/// the way (or an array is addressed by a non-numeric key).
pub fn set_at_path(root: &mut Document, path: &DocPath, value: Document) -> Result<(), PathError> {
    let (last, parents) = path.segments().split_last().ok_or(PathError::RootPath)?;

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        current = match current {
            Document::Object(fields) => {
                let slot = fields.entry(segment.as_key()).or_insert(Document::Absent);
                if slot.is_absent() {
                    *slot = Document::Object(Fields::new());
                }
                slot
            }
            Document::Array(items) => match segment {
                PathSegment::Index(idx) => {
                    if *idx >= items.len() {
                        pad_to(items, *idx, path, depth)?;
                        items.push(Document::Object(Fields::new()));
                    }
                    &mut items[*idx]
                }
                PathSegment::Key(_) => return Err(not_traversable(path, depth, "array")),
            },
            other => return Err(not_traversable(path, depth, other.type_name())),
        };
    }

    match current {
        Document::Object(fields) => {
            fields.insert(last.as_key(), value);
            Ok(())
        }
        Document::Array(items) => match last {
            PathSegment::Index(idx) => {
                if *idx >= items.len() {
                    pad_to(items, *idx, path, parents.len())?;
                    items.push(value);
                } else {
                    items[*idx] = value;
                }
                Ok(())
            }
            PathSegment::Key(_) => Err(not_traversable(path, parents.len(), "array")),
        },
        other => Err(not_traversable(path, parents.len(), other.type_name())),
    }
}

/// Remove the value at a path, the way an `$unset` applies it
///
/// Object fields are removed; array elements are replaced by null so the
/// remaining positions do not shift. Paths that do not resolve are a no-op.
///
/// Returns the removed value, if any.
pub fn unset_at_path(root: &mut Document, path: &DocPath) -> Result<Option<Document>, PathError> {
    let (last, parents) = path.segments().split_last().ok_or(PathError::RootPath)?;

    let mut current = root;
    for segment in parents {
        current = match (current, segment) {
            (Document::Object(fields), seg) => match fields.get_mut(&seg.as_key()) {
                Some(child) => child,
                None => return Ok(None),
            },
            (Document::Array(items), PathSegment::Index(idx)) => match items.get_mut(*idx) {
                Some(child) => child,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
    }

    match (current, last) {
        (Document::Object(fields), seg) => Ok(fields.shift_remove(&seg.as_key())),
        (Document::Array(items), PathSegment::Index(idx)) => Ok(items
            .get_mut(*idx)
            .map(|slot| std::mem::replace(slot, Document::Null))),
        _ => Ok(None),
    }
}

/// Fill `items` with nulls up to (not including) `index`
fn pad_to(
    items: &mut Vec<Document>,
    index: usize,
    path: &DocPath,
    depth: usize,
) -> Result<(), PathError> {
    if index - items.len() > MAX_ARRAY_PADDING {
        return Err(PathError::IndexOutOfRange {
            path: DocPath::from_segments(path.segments()[..depth].to_vec()).to_dotted(),
            index,
            len: items.len(),
        });
    }
    items.resize(index, Document::Null);
    Ok(())
}

fn not_traversable(path: &DocPath, depth: usize, found: &'static str) -> PathError {
    let prefix = DocPath::from_segments(path.segments()[..depth].to_vec());
    PathError::NotTraversable {
        path: prefix.to_dotted(),
        found,
    }
}
