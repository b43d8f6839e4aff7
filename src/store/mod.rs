//! Index store subsystem for pathdb
//!
//! Persists index entries by document id and answers path questions for the
//! view builder.
//!
//! # API
//!
//! - `append(oid, entries)` - Add a document's entries
//! - `delete(oid)` - Remove every entry of a document
//! - `query_paths(paths, kind)` - Distinct `(path, kind)` pairs ever indexed
//! - `document_ids()` - The anchor set: every document with an entry
//! - `entries(oid)` - A document's entries in scan order
//!
//! The view builder only reads (`query_paths`). Writes come from
//! `Collection`, in lockstep with document insert and delete.

mod errors;
mod sqlite;

pub use errors::{StoreError, StoreResult};
pub use sqlite::{SqliteStore, INDEX_TABLE};

pub(crate) use sqlite::ensure_schema;

use crate::indexer::{IndexEntry, ValueKind};

/// A path and one kind it has been indexed with
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathRecord {
    pub path: String,
    pub kind: ValueKind,
}

impl PathRecord {
    pub fn new(path: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Storage of flattened index entries
pub trait IndexStore {
    fn append(&self, oid: &str, entries: &[IndexEntry]) -> StoreResult<()>;

    /// Returns the number of entries removed
    fn delete(&self, oid: &str) -> StoreResult<usize>;

    /// Distinct `(path, kind)` records among `paths`, optionally limited to
    /// one kind. Paths never indexed are simply absent from the result.
    fn query_paths(
        &self,
        paths: &[String],
        kind: Option<ValueKind>,
    ) -> StoreResult<Vec<PathRecord>>;

    fn document_ids(&self) -> StoreResult<Vec<String>>;

    fn entries(&self, oid: &str) -> StoreResult<Vec<IndexEntry>>;
}
