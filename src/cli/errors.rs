//! CLI error types
//!
//! Every CLI error is fatal: the command prints it and exits non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::indexer::IndexerError;
use crate::store::StoreError;
use crate::view::QueryError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    /// Input is valid JSON but not a usable request or document
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Indexer(e) => e.code(),
            CliError::Store(e) => e.code(),
            CliError::Query(e) => e.code(),
            CliError::Input(_) => "PATHDB_CLI_INVALID_INPUT",
            CliError::Io(_) | CliError::Json(_) => "PATHDB_CLI_IO_ERROR",
        }
    }
}
