//! Indexer error types
//!
//! Error codes:
//! - PATHDB_UNSUPPORTED_TYPE
//! - PATHDB_DEPTH_EXCEEDED
//!
//! Both abort the whole scan. No entries are returned on failure.

use thiserror::Error;

/// Result type for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Path indexer errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexerError {
    /// A value the index has no kind for
    #[error("Unsupported value at '{path}': {detail}")]
    UnsupportedType { path: String, detail: String },

    /// Document nesting deeper than the configured maximum
    #[error("Nesting at '{path}' exceeds maximum depth {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },
}

impl IndexerError {
    pub fn unsupported_type(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedType {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn depth_exceeded(path: impl Into<String>, max_depth: usize) -> Self {
        Self::DepthExceeded {
            path: path.into(),
            max_depth,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexerError::UnsupportedType { .. } => "PATHDB_UNSUPPORTED_TYPE",
            IndexerError::DepthExceeded { .. } => "PATHDB_DEPTH_EXCEEDED",
        }
    }

    /// Path of the node that failed
    pub fn path(&self) -> &str {
        match self {
            IndexerError::UnsupportedType { path, .. }
            | IndexerError::DepthExceeded { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            IndexerError::unsupported_type("a", "x").code(),
            "PATHDB_UNSUPPORTED_TYPE"
        );
        assert_eq!(IndexerError::depth_exceeded("a.b", 1).code(), "PATHDB_DEPTH_EXCEEDED");
    }

    #[test]
    fn test_error_display() {
        let err = IndexerError::depth_exceeded("a.b.c", 2);
        let display = format!("{}", err);
        assert!(display.contains("a.b.c"));
        assert!(display.contains("2"));
        assert_eq!(err.path(), "a.b.c");
    }
}
