//! Per-call option bags forwarded to the store

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque multi-statement session handle owned by the store
///
/// Never inspected here: it is cloned into every store call of the
/// invocation it was passed to. Its presence does count as "atomic context"
/// for the AUTO update mode.
#[derive(Clone)]
pub struct Session(Arc<dyn Any + Send + Sync>);

impl Session {
    /// Wrap a store-specific session
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Session(Arc::new(inner))
    }

    /// Borrow the store-specific session back
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both handles wrap the same session
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(..)")
    }
}

/// Options for store reads
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Session to read within
    pub session: Option<Session>,
}

/// Options for store writes
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Insert a document when an update or replace matches nothing
    pub upsert: bool,
    /// Session to write within
    pub session: Option<Session>,
}

impl WriteOptions {
    /// Options with upsert enabled
    pub fn upsert() -> Self {
        Self {
            upsert: true,
            session: None,
        }
    }

    /// Attach a session
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// True when the write runs inside a multi-document session
    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }
}
