//! CLI command implementations
//!
//! Every command that touches the database loads the config, applies its log
//! level, and opens its own store. Results are written as one JSON response
//! line on stdout; log lines go to stderr so stdout stays machine-readable.

use std::path::Path;

use serde_json::json;

use crate::config::StoreConfig;
use crate::collection::Collection;
use crate::indexer::PathIndexer;
use crate::observability::{LogTarget, Logger};
use crate::store::SqliteStore;
use crate::view::QueryRequest;

use super::args::Command;
use super::errors::CliResult;
use super::io::{entry_json, read_input, read_json, write_line, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    Logger::set_target(LogTarget::Stderr);
    match cmd {
        Command::Init { config } => init(&config),
        Command::Insert { config, oid, file } => insert(&config, &oid, file.as_deref()),
        Command::Delete { config, oid } => delete(&config, &oid),
        Command::Scan { file, max_depth } => scan(file.as_deref(), max_depth),
        Command::Find { config } => find(&config),
    }
}

/// Loads the config, applies its log level and opens the store
fn open_store(config_path: &Path) -> CliResult<SqliteStore> {
    let config = StoreConfig::load(config_path)?;
    Logger::set_min_severity(config.min_severity()?);
    Ok(SqliteStore::open(config)?)
}

/// Creates the index schema. Running it again is harmless.
pub fn init(config_path: &Path) -> CliResult<()> {
    let store = open_store(config_path)?;
    write_response(json!({
        "initialized": true,
        "database": store.config().database_path,
    }))
}

pub fn insert(config_path: &Path, oid: &str, file: Option<&Path>) -> CliResult<()> {
    let document = read_json(file)?;
    let store = open_store(config_path)?;
    let entries = Collection::open(&store).insert(oid, &document)?;

    write_response(json!({"oid": oid, "entries": entries}))
}

pub fn delete(config_path: &Path, oid: &str) -> CliResult<()> {
    let store = open_store(config_path)?;
    let removed = Collection::open(&store).delete(oid)?;

    write_response(json!({"oid": oid, "removed": removed}))
}

/// Prints each index entry of a document as its own JSON line
pub fn scan(file: Option<&Path>, max_depth: usize) -> CliResult<()> {
    let document = read_json(file)?;
    let entries = PathIndexer::new(max_depth).scan(&document)?;

    for entry in &entries {
        write_line(&entry_json(entry))?;
    }
    Ok(())
}

/// Runs a query request read from stdin and prints the matching ids
pub fn find(config_path: &Path) -> CliResult<()> {
    let request = QueryRequest::from_json(&read_input(None)?)?;
    let store = open_store(config_path)?;
    let collection = Collection::open(&store);

    let mut builder = collection.query()?;
    request.apply(&mut builder)?;
    let ids = collection.find(&mut builder)?;

    write_response(json!(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_commands_log_to_stderr() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1}}"#).unwrap();

        run_command(Command::Scan {
            file: Some(file.path().to_path_buf()),
            max_depth: 4,
        })
        .unwrap();
        assert_eq!(Logger::target(), LogTarget::Stderr);
    }
}
