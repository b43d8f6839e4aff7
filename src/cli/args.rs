//! CLI argument definitions using clap
//!
//! Commands:
//! - pathdb init --config <path>
//! - pathdb insert --config <path> --oid <id> [--file <path>]
//! - pathdb delete --config <path> --oid <id>
//! - pathdb scan [--file <path>] [--max-depth <n>]
//! - pathdb find --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::indexer::DEFAULT_MAX_DEPTH;

/// pathdb - JSON path index with pivot view queries
#[derive(Parser, Debug)]
#[command(name = "pathdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the index schema in the configured database
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./pathdb.json")]
        config: PathBuf,
    },

    /// Index a document, replacing any earlier version
    Insert {
        /// Path to configuration file
        #[arg(long, default_value = "./pathdb.json")]
        config: PathBuf,

        /// Document id
        #[arg(long)]
        oid: String,

        /// JSON document file (stdin if omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Remove a document's index entries
    Delete {
        /// Path to configuration file
        #[arg(long, default_value = "./pathdb.json")]
        config: PathBuf,

        /// Document id
        #[arg(long)]
        oid: String,
    },

    /// Print a document's index entries without storing them
    Scan {
        /// JSON document file (stdin if omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Maximum nesting depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Run a JSON query request read from stdin
    Find {
        /// Path to configuration file
        #[arg(long, default_value = "./pathdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
