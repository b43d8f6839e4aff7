//! Query error types
//!
//! Error codes:
//! - PATHDB_UNKNOWN_PATH (rejected before any view exists)
//! - PATHDB_INVALID_PREDICATE (rejected when added)
//! - PATHDB_INVALID_STATE (builder used out of order)
//! - PATHDB_VIEW_LIFECYCLE (create or select failed, drop was attempted)
//! - PATHDB_VIEW_CLEANUP_FAILED (drop failed, the view may be orphaned)

use std::fmt;

use thiserror::Error;

use super::builder::ViewState;
use crate::engine::EngineError;
use crate::store::StoreError;

pub type QueryResult<T> = Result<T, QueryError>;

/// Step of the view lifecycle that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    Create,
    Select,
    Drop,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStage::Create => "create",
            LifecycleStage::Select => "select",
            LifecycleStage::Drop => "drop",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    /// Referenced path has never been indexed
    #[error("Unknown path '{path}': no document has ever been indexed with it")]
    UnknownPath { path: String },

    #[error("Invalid predicate on '{path}': {reason}")]
    InvalidPredicate { path: String, reason: String },

    #[error("Invalid view prefix '{0}'")]
    InvalidViewPrefix(String),

    #[error("Cannot {operation} while the view builder is {actual}")]
    InvalidState {
        operation: &'static str,
        actual: ViewState,
    },

    /// Create or select failed. The drop was attempted and succeeded.
    #[error("View {view} failed during {stage}: {message}")]
    ViewLifecycle {
        view: String,
        stage: LifecycleStage,
        message: String,
    },

    /// The drop failed. `original` holds the create or select failure that
    /// preceded it, if any.
    #[error("View {view} could not be dropped: {message}")]
    CleanupFailed {
        view: String,
        message: String,
        original: Option<Box<QueryError>>,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn unknown_path(path: impl Into<String>) -> Self {
        Self::UnknownPath { path: path.into() }
    }

    pub fn invalid_predicate(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, actual: ViewState) -> Self {
        Self::InvalidState { operation, actual }
    }

    pub fn lifecycle(view: impl Into<String>, stage: LifecycleStage, cause: EngineError) -> Self {
        Self::ViewLifecycle {
            view: view.into(),
            stage,
            message: cause.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnknownPath { .. } => "PATHDB_UNKNOWN_PATH",
            QueryError::InvalidPredicate { .. } => "PATHDB_INVALID_PREDICATE",
            QueryError::InvalidViewPrefix(_) => "PATHDB_INVALID_VIEW_PREFIX",
            QueryError::InvalidState { .. } => "PATHDB_INVALID_STATE",
            QueryError::ViewLifecycle { .. } => "PATHDB_VIEW_LIFECYCLE",
            QueryError::CleanupFailed { .. } => "PATHDB_VIEW_CLEANUP_FAILED",
            QueryError::Engine(_) => "PATHDB_ENGINE_FAILED",
            QueryError::Store(e) => e.code(),
        }
    }

    /// Returns true if the error was raised before the database was touched
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            QueryError::UnknownPath { .. }
                | QueryError::InvalidPredicate { .. }
                | QueryError::InvalidViewPrefix(_)
                | QueryError::InvalidState { .. }
        )
    }
}
