//! Partial-update compiler
//!
//! Folds [`ChangeRecord`]s into an [`UpdateInstruction`]: a `$set` mapping of
//! dotted paths to sanitized values and an `$unset` set of dotted paths.
//! An instruction with nothing in either mapping means "no write needed",
//! which [`compile`] reports as `None`.

use crate::diff::{Change, ChangeRecord, PathDiff};
use docwrite_core::{sanitized_copy, set_at_path, unset_at_path, DocPath, Document, Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Operator key for field assignments
pub const SET_OPERATOR: &str = "$set";

/// Operator key for field removals
pub const UNSET_OPERATOR: &str = "$unset";

/// Set of `$set` / `$unset` operations for one document
///
/// The two mappings never share a path; pushing a change for a path moves it
/// to the mapping that matches the latest change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInstruction {
    set: IndexMap<String, Document>,
    unset: IndexSet<String>,
}

impl UpdateInstruction {
    /// Empty instruction
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither mapping holds a path
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Number of paths touched
    pub fn len(&self) -> usize {
        self.set.len() + self.unset.len()
    }

    /// Dotted paths to assign, with their values, in emission order
    pub fn set_fields(&self) -> &IndexMap<String, Document> {
        &self.set
    }

    /// Dotted paths to remove, in emission order
    pub fn unset_fields(&self) -> &IndexSet<String> {
        &self.unset
    }

    /// Fold one change into the instruction
    ///
    /// # Errors
    ///
    /// `EmptyPath` for a root-level change.
    pub fn push(&mut self, record: &ChangeRecord<'_>) -> Result<()> {
        if record.path.is_root() {
            return Err(Error::EmptyPath);
        }
        let dotted = record.path.to_dotted();
        match record.change {
            Change::Set(value) => {
                self.unset.shift_remove(&dotted);
                self.set.insert(dotted, sanitized_copy(value));
            }
            Change::Unset => {
                self.set.shift_remove(&dotted);
                self.unset.insert(dotted);
            }
        }
        Ok(())
    }

    /// Store wire form: `{"$set": {...}, "$unset": {"path": ""}}`
    ///
    /// Empty mappings are left out.
    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        if !self.set.is_empty() {
            let set = self
                .set
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect();
            out.insert(SET_OPERATOR.to_string(), serde_json::Value::Object(set));
        }
        if !self.unset.is_empty() {
            let unset = self
                .unset
                .iter()
                .map(|k| (k.clone(), serde_json::Value::String(String::new())))
                .collect();
            out.insert(UNSET_OPERATOR.to_string(), serde_json::Value::Object(unset));
        }
        serde_json::Value::Object(out)
    }

    /// Apply the instruction to a document, `$set` first, then `$unset`
    pub fn apply_to(&self, doc: &mut Document) -> Result<()> {
        for (dotted, value) in &self.set {
            let path: DocPath = dotted.parse()?;
            set_at_path(doc, &path, value.clone())?;
        }
        for dotted in &self.unset {
            let path: DocPath = dotted.parse()?;
            unset_at_path(doc, &path)?;
        }
        Ok(())
    }
}

impl Serialize for UpdateInstruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Unset<'a>(&'a IndexSet<String>);

        impl Serialize for Unset<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for key in self.0 {
                    map.serialize_entry(key, "")?;
                }
                map.end()
            }
        }

        let entries = usize::from(!self.set.is_empty()) + usize::from(!self.unset.is_empty());
        let mut map = serializer.serialize_map(Some(entries))?;
        if !self.set.is_empty() {
            map.serialize_entry(SET_OPERATOR, &self.set)?;
        }
        if !self.unset.is_empty() {
            map.serialize_entry(UNSET_OPERATOR, &Unset(&self.unset))?;
        }
        map.end()
    }
}

impl fmt::Display for UpdateInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Fold change records into an instruction, None when nothing changes
///
/// # Errors
///
/// Propagates the first error in `records`, and `EmptyPath` if a
/// root-level change shows up.
pub fn compile<'a, I>(records: I) -> Result<Option<UpdateInstruction>>
where
    I: IntoIterator<Item = Result<ChangeRecord<'a>>>,
{
    let mut instruction = UpdateInstruction::new();
    for record in records {
        instruction.push(&record?)?;
    }
    Ok(if instruction.is_empty() {
        None
    } else {
        Some(instruction)
    })
}

/// Diff two snapshots and compile the result
///
/// # Examples
///
/// ```
/// use docwrite_core::Document;
/// use docwrite_diff::diff_and_compile;
///
/// let old = Document::object().with("a", 1).with("b", 2);
/// let new = Document::object().with("a", 1).with("c", 3);
///
/// let update = diff_and_compile(&old, &new).unwrap().unwrap();
/// assert_eq!(update.to_json().to_string(), r#"{"$set":{"c":3},"$unset":{"b":""}}"#);
///
/// assert!(diff_and_compile(&new, &new).unwrap().is_none());
/// ```
pub fn diff_and_compile(old: &Document, new: &Document) -> Result<Option<UpdateInstruction>> {
    compile(PathDiff::new(old, new))
}
