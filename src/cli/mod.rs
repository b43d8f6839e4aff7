//! CLI module for pathdb
//!
//! Provides command-line interface for:
//! - init: Create the index schema
//! - insert / delete: Maintain a document's index entries
//! - scan: Show how a document flattens, without storing it
//! - find: One-shot query execution

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{delete, find, init, insert, run, run_command, scan};
pub use errors::{CliError, CliResult};
pub use io::{entry_json, read_input, read_json, write_line, write_response};
