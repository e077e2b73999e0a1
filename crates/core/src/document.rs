//! Document model
//!
//! This module defines:
//! - Document: The semi-structured record tree that gets diffed and written
//! - Fields: Ordered field map of an object node
//! - ABSENT: Shared absent sentinel returned for missing fields
//!
//! ## Absent vs Null
//!
//! `Document::Absent` marks a field that must not exist in the persisted copy
//! (the "remove this field" state). It is a distinct variant from
//! `Document::Null`, which is a present field holding null. The two are never
//! equal, and only `Absent` is stripped by the sanitizer.
//!
//! ## Equality
//!
//! - Different variants are NEVER equal: `Int(1) != Float(1.0)`
//! - Float equality follows IEEE-754: `NaN != NaN`, `-0.0 == 0.0`
//! - Objects compare as key sets; field order does not matter

use crate::types::{DocId, ID_FIELD};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered fields of an object node (insertion order is preserved)
pub type Fields = IndexMap<String, Document>;

/// Shared absent sentinel, handed out for missing object fields.
pub static ABSENT: Document = Document::Absent;

/// A node of a document tree
///
/// Object and array nodes nest other documents; every other variant is a
/// scalar. `Id` is the store-generated identifier scalar.
#[derive(Debug, Clone, Default)]
pub enum Document {
    /// Field is explicitly absent and must be removed from the persisted copy
    #[default]
    Absent,
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Store-generated identifier
    Id(DocId),
    /// Sequence of documents
    Array(Vec<Document>),
    /// Ordered mapping of field names to documents
    Object(Fields),
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Document::Absent, Document::Absent) => true,
            (Document::Null, Document::Null) => true,
            (Document::Bool(a), Document::Bool(b)) => a == b,
            (Document::Int(a), Document::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Document::Float(a), Document::Float(b)) => a == b,
            (Document::String(a), Document::String(b)) => a == b,
            (Document::Id(a), Document::Id(b)) => a == b,
            (Document::Array(a), Document::Array(b)) => a == b,
            (Document::Object(a), Document::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

impl Document {
    /// Create an empty object node
    pub fn object() -> Self {
        Document::Object(Fields::new())
    }

    /// Create an empty array node
    pub fn array() -> Self {
        Document::Array(Vec::new())
    }

    /// Create an object node from `(key, value)` pairs
    pub fn from_fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Document)>,
    {
        Document::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Absent => "absent",
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Int(_) => "int",
            Document::Float(_) => "float",
            Document::String(_) => "string",
            Document::Id(_) => "id",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    /// Check if this is the absent sentinel
    pub fn is_absent(&self) -> bool {
        matches!(self, Document::Absent)
    }

    /// Check if this is a present null
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Check if this is an object node
    pub fn is_object(&self) -> bool {
        matches!(self, Document::Object(_))
    }

    /// Get as DocId if this is an Id value
    pub fn as_id(&self) -> Option<DocId> {
        match self {
            Document::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the fields if this is an object node
    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Document::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get the fields mutably if this is an object node
    pub fn as_object_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Document::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Raw field lookup on an object node
    ///
    /// Returns the stored value as-is, including an explicit `Absent`.
    /// Returns None for missing fields and for non-object nodes.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Field lookup that reads missing fields as [`ABSENT`]
    ///
    /// This is how the diff engine sees objects: a missing key and a key
    /// explicitly holding `Absent` are the same thing.
    pub fn field(&self, key: &str) -> &Document {
        self.get(key).unwrap_or(&ABSENT)
    }

    /// Insert a field into an object node, returning the previous value
    ///
    /// No-op (returns None) when this is not an object node.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Document>,
    ) -> Option<Document> {
        self.as_object_mut()
            .and_then(|fields| fields.insert(key.into(), value.into()))
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Document>) -> Self {
        self.insert(key, value);
        self
    }

    /// The document identifier (`_id`), if present and not absent
    pub fn id(&self) -> Option<&Document> {
        self.get(ID_FIELD).filter(|id| !id.is_absent())
    }

    /// Overwrite the document identifier (`_id`)
    pub fn set_id(&mut self, id: impl Into<Document>) {
        self.insert(ID_FIELD, id);
    }

    /// Convert to a serde_json value
    ///
    /// Absent fields and elements are dropped, identifiers render as strings
    /// and a top-level `Absent` becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Document::Absent | Document::Null => serde_json::Value::Null,
            Document::Bool(b) => serde_json::Value::Bool(*b),
            Document::Int(i) => serde_json::Value::from(*i),
            Document::Float(f) => serde_json::Value::from(*f),
            Document::String(s) => serde_json::Value::String(s.clone()),
            Document::Id(id) => serde_json::Value::String(id.to_string()),
            Document::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .filter(|item| !item.is_absent())
                    .map(Document::to_json)
                    .collect(),
            ),
            Document::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Absent | Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Int(i) => serializer.serialize_i64(*i),
            Document::Float(f) => serializer.serialize_f64(*f),
            Document::String(s) => serializer.serialize_str(s),
            Document::Id(id) => serializer.collect_str(id),
            Document::Array(items) => {
                let present = items.iter().filter(|item| !item.is_absent());
                let mut seq = serializer.serialize_seq(Some(present.clone().count()))?;
                for item in present {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Object(fields) => {
                let present = fields.iter().filter(|(_, v)| !v.is_absent());
                let mut map = serializer.serialize_map(Some(present.clone().count()))?;
                for (k, v) in present {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    /// Identifiers come back as strings; the wire form does not tag them.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Document::from)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Document::Int(i),
                None => n.as_f64().map_or(Document::Null, Document::Float),
            },
            serde_json::Value::String(s) => Document::String(s),
            serde_json::Value::Array(items) => {
                Document::Array(items.into_iter().map(Document::from).collect())
            }
            serde_json::Value::Object(map) => Document::Object(
                map.into_iter().map(|(k, v)| (k, Document::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<i64> for Document {
    fn from(i: i64) -> Self {
        Document::Int(i)
    }
}

impl From<i32> for Document {
    fn from(i: i32) -> Self {
        Document::Int(i as i64)
    }
}

impl From<f64> for Document {
    fn from(f: f64) -> Self {
        Document::Float(f)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<DocId> for Document {
    fn from(id: DocId) -> Self {
        Document::Id(id)
    }
}

impl From<Fields> for Document {
    fn from(fields: Fields) -> Self {
        Document::Object(fields)
    }
}

impl<T: Into<Document>> From<Vec<T>> for Document {
    fn from(items: Vec<T>) -> Self {
        Document::Array(items.into_iter().map(Into::into).collect())
    }
}

/// `None` maps to [`Document::Absent`], not to null.
impl<T: Into<Document>> From<Option<T>> for Document {
    fn from(value: Option<T>) -> Self {
        value.map_or(Document::Absent, Into::into)
    }
}
