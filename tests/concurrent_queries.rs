//! Concurrent Query Tests
//!
//! Tests for queries from several connections on one database file:
//! - Each builder gets its own view name
//! - Concurrent executions all succeed and see the same data
//! - No view remains afterwards

use std::collections::HashSet;
use std::thread;

use pathdb::collection::Collection;
use pathdb::config::StoreConfig;
use pathdb::store::{IndexStore, SqliteStore};
use pathdb::view::{FilterOp, ViewBuilder};
use serde_json::json;
use tempfile::TempDir;

fn config(dir: &TempDir) -> StoreConfig {
    let path = dir.path().join("index.sqlite");
    StoreConfig::new(path.to_string_lossy().into_owned())
}

/// Builders never share a view name.
#[test]
fn test_view_names_distinct() {
    let names: HashSet<String> = (0..1_000)
        .map(|_| ViewBuilder::new().view_name().to_string())
        .collect();
    assert_eq!(names.len(), 1_000);
}

/// Two threads query the same file at once.
#[test]
fn test_parallel_queries_on_one_file() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    {
        let store = SqliteStore::open(config.clone()).unwrap();
        let collection = Collection::open(&store);
        for i in 0..50 {
            collection
                .insert(&format!("d{}", i), &json!({"n": i, "even": i % 2 == 0}))
                .unwrap();
        }
    }

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || {
                let store = SqliteStore::open(config).unwrap();
                let collection = Collection::open(&store);
                let mut counts = Vec::new();
                for _ in 0..10 {
                    let mut builder = collection.query().unwrap();
                    builder.add_predicate("even", FilterOp::Eq(json!(true))).unwrap();
                    counts.push(collection.find(&mut builder).unwrap().len());
                }
                counts
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().iter().all(|&count| count == 25));
    }

    let store = SqliteStore::open(config).unwrap();
    assert!(store.view_names().unwrap().is_empty());
}

/// A writer and a reader interleave without partial documents showing up.
#[test]
fn test_reader_sees_whole_documents() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    {
        let store = SqliteStore::open(config.clone()).unwrap();
        Collection::open(&store)
            .insert("doc", &json!({"a": 1, "b": 1}))
            .unwrap();
    }

    let writer_config = config.clone();
    let writer = thread::spawn(move || {
        let store = SqliteStore::open(writer_config).unwrap();
        let collection = Collection::open(&store);
        for i in 2..30 {
            collection.insert("doc", &json!({"a": i, "b": i})).unwrap();
        }
    });

    let store = SqliteStore::open(config).unwrap();
    for _ in 0..30 {
        assert_eq!(store.entries("doc").unwrap().len(), 2);
    }
    writer.join().unwrap();
}
