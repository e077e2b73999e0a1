//! Structural diff between two document snapshots
//!
//! Walks an old and a new document tree side by side and yields one
//! [`ChangeRecord`] per path whose value must be set or removed.
//!
//! ## Rules (applied per node pair)
//!
//! 1. Reference-identical nodes, or equal scalars: nothing
//! 2. Object vs object: recurse over the union of field names, old order
//!    first, then the new object's additional fields. Field names starting
//!    with `.` or `$` fail the whole diff
//! 3. Array vs array:
//!    - shorter new array: one record replacing the whole array (a store
//!      cannot remove trailing positions without leaving holes)
//!    - absent elements on either side: whole-array replace unless the two
//!      arrays are identical, since absent elements shift persisted positions
//!    - otherwise: recurse over the shared prefix, then set every index past
//!      the old length directly
//! 4. Anything else at the root: nothing (the root cannot be patched)
//! 5. Anything else: one record carrying the new value, or `Unset` when the
//!    new value is absent
//!
//! There is no notion of moved elements; reordering shows up as per-index
//! changes.
//!
//! The walk uses an explicit stack, so it is lazy and does not recurse on
//! the call stack regardless of document depth.

use docwrite_core::{DocPath, Document, Error, PathSegment, Result, PATH_SEPARATOR};

/// Prefix of store-reserved operator names
pub const OPERATOR_PREFIX: char = '$';

/// What must happen at a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change<'a> {
    /// Write this value (borrowed from the new snapshot, not yet sanitized)
    Set(&'a Document),
    /// Remove the field
    Unset,
}

/// A single path-scoped difference
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord<'a> {
    /// Where the change applies
    pub path: DocPath,
    /// The change itself
    pub change: Change<'a>,
}

impl<'a> ChangeRecord<'a> {
    /// Record setting `value` at `path`
    pub fn set(path: DocPath, value: &'a Document) -> Self {
        Self {
            path,
            change: Change::Set(value),
        }
    }

    /// Record removing the field at `path`
    pub fn unset(path: DocPath) -> Self {
        Self {
            path,
            change: Change::Unset,
        }
    }

    /// True for `Unset` records
    pub fn is_unset(&self) -> bool {
        matches!(self.change, Change::Unset)
    }

    /// The value to write, None for `Unset`
    pub fn value(&self) -> Option<&'a Document> {
        match self.change {
            Change::Set(value) => Some(value),
            Change::Unset => None,
        }
    }
}

/// Diff between two borrowed snapshots
///
/// Cheap to build; every call to [`iter`](Self::iter) restarts the walk.
///
/// # Examples
///
/// ```
/// use docwrite_core::Document;
/// use docwrite_diff::PathDiff;
///
/// let old = Document::object().with("a", 1).with("b", 2);
/// let new = Document::object().with("a", 1).with("b", 3);
///
/// let records = PathDiff::new(&old, &new).records().unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].path.to_dotted(), "b");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathDiff<'a> {
    old: &'a Document,
    new: &'a Document,
}

impl<'a> PathDiff<'a> {
    /// Prepare a diff from `old` to `new`
    pub fn new(old: &'a Document, new: &'a Document) -> Self {
        Self { old, new }
    }

    /// Lazily walk the differences
    pub fn iter(&self) -> Differences<'a> {
        Differences::new(self.old, self.new)
    }

    /// Materialize every difference, failing on the first invalid field name
    pub fn records(&self) -> Result<Vec<ChangeRecord<'a>>> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for PathDiff<'a> {
    type Item = Result<ChangeRecord<'a>>;
    type IntoIter = Differences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazily walk the differences from `old` to `new`
pub fn diff<'a>(old: &'a Document, new: &'a Document) -> Differences<'a> {
    Differences::new(old, new)
}

// =============================================================================
// Iterator
// =============================================================================

enum Work<'a> {
    Compare {
        old: &'a Document,
        new: &'a Document,
        path: DocPath,
    },
    Emit(ChangeRecord<'a>),
}

/// Iterator over the differences between two snapshots
///
/// Yields `Err(InvalidFieldName)` once and then stops if an object field
/// name cannot be addressed by a dotted path.
pub struct Differences<'a> {
    stack: Vec<Work<'a>>,
    failed: bool,
}

impl<'a> Differences<'a> {
    fn new(old: &'a Document, new: &'a Document) -> Self {
        Self {
            stack: vec![Work::Compare {
                old,
                new,
                path: DocPath::root(),
            }],
            failed: false,
        }
    }

    /// Compare one node pair: either yield a record now, or queue children
    fn expand(
        &mut self,
        old: &'a Document,
        new: &'a Document,
        path: DocPath,
    ) -> Result<Option<ChangeRecord<'a>>> {
        if std::ptr::eq(old, new) {
            return Ok(None);
        }

        match (old, new) {
            (Document::Object(old_fields), Document::Object(new_fields)) => {
                let keys: Vec<&'a String> = old_fields
                    .keys()
                    .chain(new_fields.keys().filter(|k| !old_fields.contains_key(*k)))
                    .collect();
                for key in &keys {
                    validate_field_name(key, &path)?;
                }
                // reversed so the first field pops first
                for key in keys.into_iter().rev() {
                    self.stack.push(Work::Compare {
                        old: old.field(key),
                        new: new.field(key),
                        path: path.child(PathSegment::Key(key.clone())),
                    });
                }
                Ok(None)
            }
            (Document::Array(old_items), Document::Array(new_items)) => {
                // an empty new array replaces only when it removed elements;
                // two empty arrays fall through to the positional walk
                if new_items.len() < old_items.len() {
                    return Ok(Some(ChangeRecord::set(path, new)));
                }
                let has_absent = old_items.iter().chain(new_items).any(Document::is_absent);
                if has_absent {
                    return Ok(if identical(old, new) {
                        None
                    } else {
                        Some(ChangeRecord::set(path, new))
                    });
                }
                for idx in (old_items.len()..new_items.len()).rev() {
                    self.stack.push(Work::Emit(ChangeRecord::set(
                        path.child(PathSegment::Index(idx)),
                        &new_items[idx],
                    )));
                }
                for idx in (0..old_items.len()).rev() {
                    self.stack.push(Work::Compare {
                        old: &old_items[idx],
                        new: &new_items[idx],
                        path: path.child(PathSegment::Index(idx)),
                    });
                }
                Ok(None)
            }
            _ if same_scalar(old, new) => Ok(None),
            _ if path.is_root() => Ok(None),
            (_, Document::Absent) => Ok(Some(ChangeRecord::unset(path))),
            _ => Ok(Some(ChangeRecord::set(path, new))),
        }
    }
}

impl<'a> Iterator for Differences<'a> {
    type Item = Result<ChangeRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(work) = self.stack.pop() {
            match work {
                Work::Emit(record) => return Some(Ok(record)),
                Work::Compare { old, new, path } => match self.expand(old, new, path) {
                    Ok(Some(record)) => return Some(Ok(record)),
                    Ok(None) => {}
                    Err(e) => {
                        self.failed = true;
                        self.stack.clear();
                        return Some(Err(e));
                    }
                },
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Differences<'_> {}

// =============================================================================
// Helpers
// =============================================================================

/// Reject field names that a dotted update path cannot address
pub fn validate_field_name(key: &str, parent: &DocPath) -> Result<()> {
    if key.starts_with(PATH_SEPARATOR) || key.starts_with(OPERATOR_PREFIX) {
        return Err(Error::InvalidFieldName {
            field: key.to_string(),
            path: parent.to_dotted(),
        });
    }
    Ok(())
}

/// Scalar identity. Floats compare by bits first so a NaN is identical to itself.
fn same_scalar(a: &Document, b: &Document) -> bool {
    match (a, b) {
        (Document::Float(x), Document::Float(y)) => x.to_bits() == y.to_bits() || x == y,
        (Document::Array(_), _) | (Document::Object(_), _) => false,
        _ => a == b,
    }
}

/// Deep structural identity, with [`same_scalar`] at the leaves
fn identical(a: &Document, b: &Document) -> bool {
    match (a, b) {
        (Document::Array(x), Document::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| identical(l, r))
        }
        (Document::Object(x), Document::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| identical(v, w)))
        }
        _ => same_scalar(a, b),
    }
}
