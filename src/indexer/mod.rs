//! Path indexer subsystem for pathdb
//!
//! Flattens a JSON document into an ordered sequence of typed
//! `(path, value, depth)` entries suitable for relational storage.
//!
//! # Invariants
//!
//! - One entry per non-root node, pre-order, siblings in natural key order
//! - `depth(child) = depth(parent) + 1`, root children at depth 0
//! - `path(child) = path(parent) + "." + key`
//! - Containers carry the canonical JSON text of their subtree
//! - A failed scan returns no entries at all
//!
//! # Kinds
//!
//! `float`, `null`, `boolean`, `string`, `array`, `object`. JSON integers
//! are stored as `float`.

mod entry;
mod errors;
mod scanner;

pub use entry::{IndexEntry, IndexValue, StorageColumn, ValueKind};
pub use errors::{IndexerError, IndexerResult};
pub use scanner::{scan, PathIndexer, DEFAULT_MAX_DEPTH};
