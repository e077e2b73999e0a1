//! Identifying filters for updates and deletes
//!
//! By default a document is targeted by its `_id` alone. Identifier-only
//! filters cannot tell whether the persisted document is still the version
//! the caller read: two concurrent updates may both report a match.
//! [`FilterStrategy::Versioned`] adds a version field to the filter so a
//! stale write matches nothing and surfaces as an unmatched write.

use docwrite_core::{Document, Error, Result, ID_FIELD};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied filter builder
pub type FilterFn = Arc<dyn Fn(&Document) -> Result<Document> + Send + Sync>;

/// How the identifying filter of a document is built
#[derive(Clone, Default)]
pub enum FilterStrategy {
    /// `{ _id: doc._id }`
    #[default]
    ById,
    /// `{ _id: doc._id, <field>: doc.<field> }`
    ///
    /// A missing version field filters on null, which also matches documents
    /// that never had the field.
    Versioned {
        /// Version or fingerprint field name
        field: String,
    },
    /// Fully custom filter
    Custom(FilterFn),
}

impl FilterStrategy {
    /// Version-aware filter on `field`
    pub fn versioned(field: impl Into<String>) -> Self {
        FilterStrategy::Versioned {
            field: field.into(),
        }
    }

    /// Custom filter built by `f`
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Result<Document> + Send + Sync + 'static,
    {
        FilterStrategy::Custom(Arc::new(f))
    }

    /// True for anything but the default identifier filter
    pub fn is_customized(&self) -> bool {
        !matches!(self, FilterStrategy::ById)
    }

    /// Filter targeting the persisted copy of `doc`
    ///
    /// For updates, `doc` is the snapshot the caller last read.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` when the identifier is missing.
    pub fn filter_for(&self, doc: &Document) -> Result<Document> {
        match self {
            FilterStrategy::ById => Ok(Document::object().with(ID_FIELD, require_id(doc)?.clone())),
            FilterStrategy::Versioned { field } => {
                let version = match doc.field(field) {
                    Document::Absent => Document::Null,
                    other => other.clone(),
                };
                Ok(Document::object()
                    .with(ID_FIELD, require_id(doc)?.clone())
                    .with(field.as_str(), version))
            }
            FilterStrategy::Custom(f) => f(doc),
        }
    }
}

impl fmt::Debug for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStrategy::ById => f.write_str("ById"),
            FilterStrategy::Versioned { field } => {
                f.debug_struct("Versioned").field("field", field).finish()
            }
            FilterStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn require_id(doc: &Document) -> Result<&Document> {
    doc.id().ok_or_else(|| {
        Error::invalid_document(format!("document has no '{}' field to filter on", ID_FIELD))
    })
}
