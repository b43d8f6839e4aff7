//! Pivot view query subsystem for pathdb
//!
//! Turns path predicates into a temporary pivot view over the index table
//! and runs them as one atomic unit.
//!
//! # Flow
//!
//! ```text
//! ViewBuilder (predicates, orderings)
//!     → compile_view_definition (path validation, pivot SQL)
//!     → ViewExecutor::execute (create, select, drop in one transaction)
//!     → matching document ids
//! ```
//!
//! Path values never reach SQL text as values: paths become quoted
//! identifiers and literals only after the store confirms them, predicate
//! values are always bound parameters.

mod ast;
mod builder;
mod errors;
mod executor;
mod request;
mod sql;

pub use ast::{Connective, FilterOp, Predicate, SortDirection, SortSpec};
pub use builder::{ViewBuilder, ViewState, DEFAULT_VIEW_PREFIX};
pub use errors::{LifecycleStage, QueryError, QueryResult};
pub use executor::ViewExecutor;
pub use request::{OrderingRequest, PredicateRequest, QueryRequest};
pub use sql::{
    path_column, pivot_definition, quote_identifier, CompiledSelection, PivotColumn, OID_COLUMN,
};
