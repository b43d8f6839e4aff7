//! View builder (query compiler)
//!
//! Accumulates path predicates and orderings, validates every referenced path
//! against the index store, and compiles the pivot view plus the selection
//! run against it.
//!
//! # State machine
//!
//! `Building → Validated → Materialized → TornDown`
//!
//! - Predicates and orderings can only be added while `Building`
//! - `compile_view_definition` moves to `Validated`, or stays `Building` on
//!   `UnknownPath`
//! - The executor moves to `Materialized` once the view exists and to
//!   `TornDown` once the drop has been attempted
//! - A `TornDown` builder cannot run again; build a new one, which also gets
//!   a new view name

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use super::ast::{to_param, Connective, FilterOp, Predicate, SortDirection, SortSpec};
use super::errors::{QueryError, QueryResult};
use super::sql::{self, CompiledSelection, PivotColumn};
use crate::config::is_plain_identifier;
use crate::store::IndexStore;

/// Prefix of generated view names unless configured otherwise
pub const DEFAULT_VIEW_PREFIX: &str = "pathdb_view";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Building,
    Validated,
    Materialized,
    TornDown,
}

impl ViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Building => "building",
            ViewState::Validated => "validated",
            ViewState::Materialized => "materialized",
            ViewState::TornDown => "torn down",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct ViewBuilder {
    view_name: String,
    state: ViewState,
    predicates: Vec<Predicate>,
    orderings: Vec<SortSpec>,
    /// Referenced paths, first reference order, no duplicates
    paths: Vec<String>,
    columns: Vec<PivotColumn>,
    definition: Option<String>,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBuilder {
    pub fn new() -> Self {
        Self::named(DEFAULT_VIEW_PREFIX)
    }

    /// Creates a builder whose view name starts with `prefix`
    pub fn with_prefix(prefix: &str) -> QueryResult<Self> {
        if !is_plain_identifier(prefix) {
            return Err(QueryError::InvalidViewPrefix(prefix.to_string()));
        }
        Ok(Self::named(prefix))
    }

    fn named(prefix: &str) -> Self {
        Self {
            view_name: format!("{}_{}", prefix, Uuid::new_v4().simple()),
            state: ViewState::Building,
            predicates: Vec::new(),
            orderings: Vec::new(),
            paths: Vec::new(),
            columns: Vec::new(),
            definition: None,
        }
    }

    /// Unique name of this builder's view
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn referenced_paths(&self) -> &[String] {
        &self.paths
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn orderings(&self) -> &[SortSpec] {
        &self.orderings
    }

    /// Compiled view body, once validated
    pub fn view_definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    /// Adds a predicate AND-combined with the chain so far
    pub fn add_predicate(
        &mut self,
        path: impl Into<String>,
        op: FilterOp,
    ) -> QueryResult<&mut Self> {
        self.push_predicate(path.into(), op, Connective::And)
    }

    /// Adds a predicate OR-combined with the chain so far.
    ///
    /// The chain has no grouping: terms combine left to right in the order
    /// added, regardless of AND/OR precedence.
    pub fn add_or_predicate(
        &mut self,
        path: impl Into<String>,
        op: FilterOp,
    ) -> QueryResult<&mut Self> {
        self.push_predicate(path.into(), op, Connective::Or)
    }

    pub fn add_ordering(
        &mut self,
        path: impl Into<String>,
        direction: SortDirection,
    ) -> QueryResult<&mut Self> {
        self.require_building("add an ordering")?;
        let path = path.into();
        self.reference(&path);
        self.orderings.push(SortSpec::new(path, direction));
        Ok(self)
    }

    fn push_predicate(
        &mut self,
        path: String,
        op: FilterOp,
        connective: Connective,
    ) -> QueryResult<&mut Self> {
        self.require_building("add a predicate")?;
        validate_operands(&path, &op)?;
        self.reference(&path);
        self.predicates.push(Predicate::new(path, op, connective));
        Ok(self)
    }

    fn reference(&mut self, path: &str) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_string());
        }
    }

    fn require_building(&self, operation: &'static str) -> QueryResult<()> {
        if self.state != ViewState::Building {
            return Err(QueryError::invalid_state(operation, self.state));
        }
        Ok(())
    }

    /// Validates referenced paths and compiles the pivot view body.
    ///
    /// Fails with `UnknownPath` for the first referenced path the store has
    /// never indexed; the builder then stays `Building`. Calling it again on a
    /// `Validated` builder returns the same definition.
    pub fn compile_view_definition<S: IndexStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> QueryResult<&str> {
        match self.state {
            ViewState::Building => {}
            ViewState::Validated => return Ok(self.definition.as_deref().unwrap_or_default()),
            other => return Err(QueryError::invalid_state("compile the view", other)),
        }

        let records = store.query_paths(&self.paths, None)?;

        let mut columns = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let storage: BTreeSet<_> = records
                .iter()
                .filter(|r| &r.path == path)
                .map(|r| r.kind.storage_column())
                .collect();
            if storage.is_empty() {
                return Err(QueryError::unknown_path(path));
            }
            columns.push(PivotColumn {
                path: path.clone(),
                storage: storage.into_iter().collect(),
            });
        }

        self.state = ViewState::Validated;
        let definition = self.definition.insert(sql::pivot_definition(&columns));
        self.columns = columns;
        Ok(definition.as_str())
    }

    /// Compiles the selection run against the view.
    ///
    /// Only available once paths have been validated, so every identifier it
    /// emits refers to a known path.
    pub fn compile_selection(&self) -> QueryResult<CompiledSelection> {
        if self.state == ViewState::Building {
            return Err(QueryError::invalid_state("compile the selection", self.state));
        }
        sql::selection(
            &self.view_name,
            &self.columns,
            &self.predicates,
            &self.orderings,
        )
    }

    pub(crate) fn mark_materialized(&mut self) {
        self.state = ViewState::Materialized;
    }

    pub(crate) fn mark_torn_down(&mut self) {
        self.state = ViewState::TornDown;
    }
}

/// Rejects operands that could never bind, or that mix value kinds
fn validate_operands(path: &str, op: &FilterOp) -> QueryResult<()> {
    match op {
        FilterOp::In(values) | FilterOp::NotIn(values) if values.is_empty() => {
            return Err(QueryError::invalid_predicate(
                path,
                format!("'{}' needs at least one value", op.op_name()),
            ));
        }
        _ => {}
    }

    for operand in op.operands() {
        to_param(operand).map_err(|reason| QueryError::invalid_predicate(path, reason))?;
    }
    op.operand_storage()
        .map_err(|reason| QueryError::invalid_predicate(path, reason))?;
    Ok(())
}
