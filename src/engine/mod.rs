//! Relational execution seam
//!
//! The view executor needs four things from a database: create a view, drop a
//! view, run a query returning document ids, and wrap all of that in one
//! transaction. `SqlEngine` is one transaction's capability set,
//! `TransactionalEngine` opens that transaction.
//!
//! SQLite (`rusqlite::Connection`) is the one implementation shipped here.
//! Any engine with ANSI-like view, join and transaction semantics fits.

mod sqlite;

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure raised by a non-SQLite engine
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// A bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Null,
    Numeric(f64),
    Boolean(bool),
    Text(String),
}

/// Operations available inside one atomic unit
pub trait SqlEngine {
    /// `CREATE VIEW <name> AS <definition>`
    fn create_view(&self, name: &str, definition: &str) -> EngineResult<()>;

    fn drop_view_if_exists(&self, name: &str) -> EngineResult<()>;

    /// Runs a query whose first column is a document id
    fn run_query(&self, sql: &str, params: &[QueryParam]) -> EngineResult<Vec<String>>;

    /// Checks the catalog for a view
    fn view_exists(&self, name: &str) -> EngineResult<bool>;
}

/// An engine that can run work atomically.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
pub trait TransactionalEngine {
    type Unit: SqlEngine + ?Sized;

    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self::Unit) -> Result<T, E>,
        E: From<EngineError>;
}
