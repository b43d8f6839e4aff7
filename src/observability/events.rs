//! Observable events in pathdb

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Store lifecycle
    /// Backing database opened and schema ensured
    StoreOpened,

    // Document indexing
    /// Document entries replaced in the index
    DocumentIndexed,
    /// Document entries removed from the index
    DocumentDeleted,
    /// Document scan failed, nothing persisted
    DocumentRejected,

    // Query views
    /// Pivot view created
    ViewCreated,
    /// Pivot view dropped
    ViewDropped,
    /// Pivot view could not be dropped
    ViewCleanupFailed,

    // Queries
    /// Query failed validation before touching the database
    QueryRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::DocumentIndexed => "DOCUMENT_INDEXED",
            Event::DocumentDeleted => "DOCUMENT_DELETED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::ViewCreated => "VIEW_CREATED",
            Event::ViewDropped => "VIEW_DROPPED",
            Event::ViewCleanupFailed => "VIEW_CLEANUP_FAILED",
            Event::QueryRejected => "QUERY_REJECTED",
        }
    }

    /// Returns true if the event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::DocumentRejected | Event::ViewCleanupFailed | Event::QueryRejected
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
