//! View executor
//!
//! Runs one compiled query as a single atomic unit.
//!
//! # Execution Flow (strict order)
//!
//! 1. Validate and compile the builder if it is still `Building`
//!    (`UnknownPath` stops here, before any transaction is opened)
//! 2. Open a transaction
//! 3. Create the view
//! 4. Run the selection
//! 5. Drop the view, whatever happened in 3 and 4
//! 6. Commit on success, roll back on failure
//!
//! # Invariants
//!
//! - No view outlives `execute`
//! - The drop is attempted even when the engine cannot roll back
//! - A drop failure is reported as `CleanupFailed` and never hides the
//!   failure that preceded it

use super::builder::{ViewBuilder, ViewState};
use super::errors::{LifecycleStage, QueryError, QueryResult};
use super::sql::CompiledSelection;
use crate::engine::{SqlEngine, TransactionalEngine};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::IndexStore;

pub struct ViewExecutor<'e, E: TransactionalEngine> {
    engine: &'e E,
}

impl<'e, E: TransactionalEngine> ViewExecutor<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Executes the builder's query, returning matching document ids.
    ///
    /// `store` validates referenced paths; for SQLite it is usually the same
    /// object as the engine.
    pub fn execute<S: IndexStore + ?Sized>(
        &self,
        store: &S,
        builder: &mut ViewBuilder,
    ) -> QueryResult<Vec<String>> {
        match builder.state() {
            ViewState::Building => {
                let compiled = builder.compile_view_definition(store).map(|_| ());
                if let Err(err) = compiled {
                    log_event_with_fields(
                        Event::QueryRejected,
                        &[("code", err.code()), ("view", builder.view_name())],
                    );
                    return Err(err);
                }
            }
            ViewState::Validated => {}
            other => return Err(QueryError::invalid_state("execute", other)),
        }

        let selection = builder.compile_selection()?;
        let definition = builder.view_definition().unwrap_or_default().to_string();
        let view = builder.view_name().to_string();

        let scope = ObservationScope::with_fields("QUERY", &[("view", &view)]);
        let result = self.engine.run_in_transaction(|unit| {
            materialize_and_select(unit, &view, &definition, &selection, builder)
        });

        match &result {
            Ok(ids) => scope.complete_with_fields(&[("rows", &ids.len().to_string())]),
            Err(err) => scope.fail(&err.to_string()),
        }
        result
    }
}

/// Create, select, drop. The drop runs on every path out.
fn materialize_and_select<U: SqlEngine + ?Sized>(
    unit: &U,
    view: &str,
    definition: &str,
    selection: &CompiledSelection,
    builder: &mut ViewBuilder,
) -> QueryResult<Vec<String>> {
    let outcome = match unit.create_view(view, definition) {
        Err(e) => Err(QueryError::lifecycle(view, LifecycleStage::Create, e)),
        Ok(()) => {
            builder.mark_materialized();
            log_event_with_fields(Event::ViewCreated, &[("view", view)]);
            unit.run_query(&selection.sql, &selection.params)
                .map_err(|e| QueryError::lifecycle(view, LifecycleStage::Select, e))
        }
    };

    let dropped = unit.drop_view_if_exists(view);
    builder.mark_torn_down();

    match dropped {
        Ok(()) => {
            log_event_with_fields(Event::ViewDropped, &[("view", view)]);
            outcome
        }
        Err(e) => {
            let message = e.to_string();
            log_event_with_fields(
                Event::ViewCleanupFailed,
                &[("view", view), ("reason", &message)],
            );
            Err(QueryError::CleanupFailed {
                view: view.to_string(),
                message,
                original: outcome.err().map(Box::new),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EngineResult, QueryParam};
    use crate::indexer::{scan, IndexEntry, ValueKind};
    use crate::store::{ensure_schema, PathRecord, SqliteStore, StoreResult};
    use crate::view::{FilterOp, SortDirection};
    use rusqlite::Connection;
    use serde_json::json;
    use std::cell::Cell;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let docs = [
            ("d1", json!({"name": "ann", "age": 30, "tags": ["a"]})),
            ("d2", json!({"name": "bob", "age": 40})),
            ("d3", json!({"name": "cy"})),
        ];
        for (oid, doc) in docs {
            store.append(oid, &scan(&doc).unwrap()).unwrap();
        }
        store
    }

    #[test]
    fn test_execute_returns_matching_ids() {
        let store = store();
        let mut builder = ViewBuilder::new();
        builder.add_predicate("age", FilterOp::Gte(json!(35))).unwrap();

        let ids = ViewExecutor::new(&store).execute(&store, &mut builder).unwrap();
        assert_eq!(ids, vec!["d2".to_string()]);
        assert_eq!(builder.state(), ViewState::TornDown);
        assert!(store.view_names().unwrap().is_empty());
    }

    #[test]
    fn test_execute_orders_by_path() {
        let store = store();
        let mut builder = ViewBuilder::new();
        builder.add_ordering("name", SortDirection::Descending).unwrap();

        let ids = ViewExecutor::new(&store).execute(&store, &mut builder).unwrap();
        assert_eq!(ids, vec!["d3", "d2", "d1"]);
    }

    #[test]
    fn test_torn_down_builder_cannot_rerun() {
        let store = store();
        let mut builder = ViewBuilder::new();
        let executor = ViewExecutor::new(&store);
        executor.execute(&store, &mut builder).unwrap();

        let err = executor.execute(&store, &mut builder).unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidState {
                actual: ViewState::TornDown,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_path_never_creates_view() {
        let store = store();
        let mut builder = ViewBuilder::new();
        builder.add_predicate("salary", FilterOp::Gt(json!(1))).unwrap();

        let err = ViewExecutor::new(&store).execute(&store, &mut builder).unwrap_err();
        assert_eq!(err.code(), "PATHDB_UNKNOWN_PATH");
        assert_eq!(builder.state(), ViewState::Building);
        assert!(store.view_names().unwrap().is_empty());
    }

    /// Which engine call should fail
    #[derive(Default)]
    struct Faults {
        create: bool,
        select: bool,
        drop: bool,
    }

    /// Engine over its own connection that injects failures and, optionally,
    /// has no transaction support at all.
    struct FaultyEngine {
        conn: Connection,
        faults: Faults,
        atomic: bool,
        drops_attempted: Cell<usize>,
    }

    impl FaultyEngine {
        fn new(faults: Faults, atomic: bool) -> Self {
            let conn = Connection::open_in_memory().unwrap();
            ensure_schema(&conn).unwrap();
            conn.append("d1", &scan(&json!({"age": 30})).unwrap()).unwrap();
            Self {
                conn,
                faults,
                atomic,
                drops_attempted: Cell::new(0),
            }
        }

        fn has_view(&self, name: &str) -> bool {
            self.conn.view_exists(name).unwrap()
        }
    }

    impl SqlEngine for FaultyEngine {
        fn create_view(&self, name: &str, definition: &str) -> EngineResult<()> {
            if self.faults.create {
                return Err(EngineError::other("create refused"));
            }
            self.conn.create_view(name, definition)
        }

        fn drop_view_if_exists(&self, name: &str) -> EngineResult<()> {
            self.drops_attempted.set(self.drops_attempted.get() + 1);
            if self.faults.drop {
                return Err(EngineError::other("drop refused"));
            }
            self.conn.drop_view_if_exists(name)
        }

        fn run_query(&self, sql: &str, params: &[QueryParam]) -> EngineResult<Vec<String>> {
            if self.faults.select {
                return Err(EngineError::other("select refused"));
            }
            self.conn.run_query(sql, params)
        }

        fn view_exists(&self, name: &str) -> EngineResult<bool> {
            self.conn.view_exists(name)
        }
    }

    impl TransactionalEngine for FaultyEngine {
        type Unit = FaultyEngine;

        fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
        where
            F: FnOnce(&FaultyEngine) -> Result<T, E>,
            E: From<EngineError>,
        {
            if !self.atomic {
                return work(self);
            }
            self.conn.execute_batch("BEGIN").map_err(EngineError::from)?;
            let result = work(self);
            let end = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
            self.conn.execute_batch(end).map_err(EngineError::from)?;
            result
        }
    }

    impl IndexStore for FaultyEngine {
        fn append(&self, oid: &str, entries: &[IndexEntry]) -> StoreResult<()> {
            self.conn.append(oid, entries)
        }

        fn delete(&self, oid: &str) -> StoreResult<usize> {
            self.conn.delete(oid)
        }

        fn query_paths(
            &self,
            paths: &[String],
            kind: Option<ValueKind>,
        ) -> StoreResult<Vec<PathRecord>> {
            self.conn.query_paths(paths, kind)
        }

        fn document_ids(&self) -> StoreResult<Vec<String>> {
            self.conn.document_ids()
        }

        fn entries(&self, oid: &str) -> StoreResult<Vec<IndexEntry>> {
            self.conn.entries(oid)
        }
    }

    fn run(engine: &FaultyEngine) -> (ViewBuilder, QueryResult<Vec<String>>) {
        let mut builder = ViewBuilder::new();
        builder.add_predicate("age", FilterOp::Eq(json!(30))).unwrap();
        let result = ViewExecutor::new(engine).execute(engine, &mut builder);
        (builder, result)
    }

    #[test]
    fn test_healthy_faulty_engine_matches() {
        let engine = FaultyEngine::new(Faults::default(), true);
        let (builder, result) = run(&engine);

        assert_eq!(result.unwrap(), vec!["d1".to_string()]);
        assert!(!engine.has_view(builder.view_name()));
    }

    #[test]
    fn test_select_failure_still_drops_without_rollback() {
        let engine = FaultyEngine::new(
            Faults {
                select: true,
                ..Faults::default()
            },
            false,
        );
        let (builder, result) = run(&engine);

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            QueryError::ViewLifecycle {
                stage: LifecycleStage::Select,
                ..
            }
        ));
        assert_eq!(engine.drops_attempted.get(), 1);
        assert!(!engine.has_view(builder.view_name()));
        assert_eq!(builder.state(), ViewState::TornDown);
    }

    #[test]
    fn test_create_failure_still_attempts_drop() {
        let engine = FaultyEngine::new(
            Faults {
                create: true,
                ..Faults::default()
            },
            false,
        );
        let (builder, result) = run(&engine);

        assert!(matches!(
            result.unwrap_err(),
            QueryError::ViewLifecycle {
                stage: LifecycleStage::Create,
                ..
            }
        ));
        assert_eq!(engine.drops_attempted.get(), 1);
        assert_eq!(builder.state(), ViewState::TornDown);
    }

    #[test]
    fn test_drop_failure_reported_separately() {
        let engine = FaultyEngine::new(
            Faults {
                drop: true,
                ..Faults::default()
            },
            false,
        );
        let (builder, result) = run(&engine);

        match result.unwrap_err() {
            QueryError::CleanupFailed { view, original, .. } => {
                assert_eq!(view, builder.view_name());
                assert!(original.is_none());
            }
            other => panic!("expected CleanupFailed, got {:?}", other),
        }
        // Without a transaction the view really is orphaned
        assert!(engine.has_view(builder.view_name()));
    }

    #[test]
    fn test_drop_failure_keeps_original_failure() {
        let engine = FaultyEngine::new(
            Faults {
                select: true,
                drop: true,
                ..Faults::default()
            },
            true,
        );
        let (builder, result) = run(&engine);

        match result.unwrap_err() {
            QueryError::CleanupFailed { original, .. } => {
                let original = original.expect("select failure should be kept");
                assert_eq!(original.code(), "PATHDB_VIEW_LIFECYCLE");
            }
            other => panic!("expected CleanupFailed, got {:?}", other),
        }
        // The rollback removed the view the drop could not
        assert!(!engine.has_view(builder.view_name()));
    }
}
