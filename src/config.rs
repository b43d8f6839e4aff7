//! Store configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "database_path": "./pathdb.sqlite",
//!   "max_depth": 64,
//!   "busy_timeout_ms": 5000,
//!   "view_prefix": "pathdb_view",
//!   "journal_mode": "wal",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `database_path` is required.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indexer::DEFAULT_MAX_DEPTH;
use crate::observability::Severity;

/// In-memory database path understood by SQLite
pub const IN_MEMORY: &str = ":memory:";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        "PATHDB_CONFIG_ERROR"
    }
}

/// SQLite journal modes the store accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Deepest entry depth the indexer accepts
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// How long a writer waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Prefix of generated view names
    #[serde(default = "default_view_prefix")]
    pub view_prefix: String,

    #[serde(default = "default_journal_mode")]
    pub journal_mode: JournalMode,

    /// Minimum log severity (trace, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_busy_timeout_ms() -> u64 {
    5000
}
fn default_view_prefix() -> String {
    "pathdb_view".to_string()
}
fn default_journal_mode() -> JournalMode {
    JournalMode::Wal
}
fn default_log_level() -> String {
    "info".to_string()
}

impl StoreConfig {
    /// Config for a database file with every other field defaulted
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            max_depth: default_max_depth(),
            busy_timeout_ms: default_busy_timeout_ms(),
            view_prefix: default_view_prefix(),
            journal_mode: default_journal_mode(),
            log_level: default_log_level(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            journal_mode: JournalMode::Memory,
            ..Self::new(IN_MEMORY)
        }
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database_path.is_empty() {
            return Err(ConfigError::invalid("database_path", "must not be empty"));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::invalid("max_depth", "must be > 0"));
        }

        if !is_plain_identifier(&self.view_prefix) {
            return Err(ConfigError::invalid(
                "view_prefix",
                format!(
                    "'{}' must start with a letter or '_' and contain only letters, digits and '_'",
                    self.view_prefix
                ),
            ));
        }

        self.min_severity()?;

        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn min_severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::invalid("log_level", format!("unknown level '{}'", self.log_level))
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
