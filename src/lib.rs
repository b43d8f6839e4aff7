//! pathdb - JSON path index with pivot view queries
//!
//! Documents are flattened into `(path, depth, kind, value)` entries stored in
//! a relational table. Queries name paths, get compiled into a temporary pivot
//! view with one column per path, and run as a single atomic unit.
//!
//! ```ignore
//! use pathdb::collection::Collection;
//! use pathdb::store::SqliteStore;
//! use pathdb::view::FilterOp;
//! use serde_json::json;
//!
//! let store = SqliteStore::open_in_memory()?;
//! let people = Collection::open(&store);
//! people.insert("p1", &json!({"name": "ann", "age": 31}))?;
//!
//! let mut query = people.query()?;
//! query.add_predicate("age", FilterOp::Gte(json!(18)))?;
//! let ids = people.find(&mut query)?;
//! ```

pub mod cli;
pub mod collection;
pub mod config;
pub mod engine;
pub mod indexer;
pub mod observability;
pub mod store;
pub mod view;
