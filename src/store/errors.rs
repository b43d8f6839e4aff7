//! Index store errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::indexer::IndexerError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Document could not be scanned; nothing was written
    #[error("Document {oid} rejected: {source}")]
    Indexer {
        oid: String,
        #[source]
        source: IndexerError,
    },

    /// Stored row does not decode to an index entry
    #[error("Corrupt index entry for {oid} at '{path}': {reason}")]
    CorruptEntry {
        oid: String,
        path: String,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StoreError {
    pub fn indexer(oid: impl Into<String>, source: IndexerError) -> Self {
        Self::Indexer {
            oid: oid.into(),
            source,
        }
    }

    pub fn corrupt_entry(
        oid: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CorruptEntry {
            oid: oid.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Sqlite(_) | StoreError::Engine(_) => "PATHDB_STORE_FAILED",
            StoreError::Indexer { source, .. } => source.code(),
            StoreError::CorruptEntry { .. } => "PATHDB_CORRUPT_ENTRY",
            StoreError::Config(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_error_keeps_its_code() {
        let err = StoreError::indexer("doc1", IndexerError::depth_exceeded("a", 1));
        assert_eq!(err.code(), "PATHDB_DEPTH_EXCEEDED");
        assert!(err.to_string().contains("doc1"));
    }

    #[test]
    fn test_corrupt_entry_display() {
        let err = StoreError::corrupt_entry("doc1", "a.b", "unknown kind 'int'");
        assert_eq!(err.code(), "PATHDB_CORRUPT_ENTRY");
        assert!(err.to_string().contains("a.b"));
    }
}
