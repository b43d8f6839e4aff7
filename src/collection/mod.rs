//! Document collection over the path index
//!
//! Keeps the index in lockstep with document writes and runs queries.
//!
//! # Write path
//!
//! 1. Scan the document (nothing is written if this fails)
//! 2. In one transaction: delete the document's previous entries, append the
//!    new ones
//!
//! Readers therefore see either the old entries or the new ones, never a mix.

use serde_json::Value;

use crate::engine::TransactionalEngine;
use crate::indexer::{IndexEntry, PathIndexer};
use crate::observability::{log_event_with_fields, Event};
use crate::store::{IndexStore, SqliteStore, StoreError, StoreResult};
use crate::view::{QueryResult, ViewBuilder, ViewExecutor};

pub struct Collection<'s> {
    store: &'s SqliteStore,
    indexer: PathIndexer,
}

impl<'s> Collection<'s> {
    pub fn new(store: &'s SqliteStore, indexer: PathIndexer) -> Self {
        Self { store, indexer }
    }

    /// Collection whose indexer uses the store's configured depth limit
    pub fn open(store: &'s SqliteStore) -> Self {
        let indexer = PathIndexer::new(store.config().max_depth);
        Self::new(store, indexer)
    }

    pub fn store(&self) -> &SqliteStore {
        self.store
    }

    /// Indexes `document` under `oid`, replacing any earlier version.
    ///
    /// Returns the number of entries written.
    pub fn insert(&self, oid: &str, document: &Value) -> StoreResult<usize> {
        let entries = match self.indexer.scan(document) {
            Ok(entries) => entries,
            Err(err) => {
                log_event_with_fields(
                    Event::DocumentRejected,
                    &[("code", err.code()), ("oid", oid), ("path", err.path())],
                );
                return Err(StoreError::indexer(oid, err));
            }
        };

        self.store.run_in_transaction(|unit| {
            unit.delete(oid)?;
            unit.append(oid, &entries)
        })?;

        log_event_with_fields(
            Event::DocumentIndexed,
            &[("entries", &entries.len().to_string()), ("oid", oid)],
        );
        Ok(entries.len())
    }

    /// Removes every entry of `oid`, returning how many there were
    pub fn delete(&self, oid: &str) -> StoreResult<usize> {
        let removed = self.store.delete(oid)?;
        log_event_with_fields(
            Event::DocumentDeleted,
            &[("entries", &removed.to_string()), ("oid", oid)],
        );
        Ok(removed)
    }

    pub fn entries(&self, oid: &str) -> StoreResult<Vec<IndexEntry>> {
        self.store.entries(oid)
    }

    pub fn document_ids(&self) -> StoreResult<Vec<String>> {
        self.store.document_ids()
    }

    /// A fresh builder named with the store's configured view prefix
    pub fn query(&self) -> QueryResult<ViewBuilder> {
        ViewBuilder::with_prefix(&self.store.config().view_prefix)
    }

    /// Runs the builder's query, returning matching document ids
    pub fn find(&self, builder: &mut ViewBuilder) -> QueryResult<Vec<String>> {
        ViewExecutor::new(self.store).execute(self.store, builder)
    }
}
