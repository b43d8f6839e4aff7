//! SQLite-backed index store
//!
//! One row per index entry in `path_index`. Each kind writes its value to the
//! storage column `ValueKind::storage_column` names; the other value columns
//! stay NULL.

use rusqlite::{params, params_from_iter, Connection, Transaction, TransactionBehavior};

use super::errors::{StoreError, StoreResult};
use super::{IndexStore, PathRecord};
use crate::config::StoreConfig;
use crate::engine::{EngineError, TransactionalEngine};
use crate::indexer::{IndexEntry, IndexValue, ValueKind};
use crate::observability::{log_event_with_fields, Event, Logger};

/// Table holding every index entry
pub const INDEX_TABLE: &str = "path_index";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS path_index (
    oid           TEXT    NOT NULL,
    seq           INTEGER NOT NULL,
    path          TEXT    NOT NULL,
    depth         INTEGER NOT NULL,
    kind          TEXT    NOT NULL,
    value_numeric REAL,
    value_boolean INTEGER,
    value_text    TEXT,
    PRIMARY KEY (oid, seq)
);
CREATE INDEX IF NOT EXISTS path_index_by_path ON path_index (path, kind);
";

/// Creates the index table and its indexes if missing
pub(crate) fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Index store and transactional engine over one SQLite connection.
///
/// A connection is not shared between threads; concurrent callers open their
/// own store on the same database file.
pub struct SqliteStore {
    conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    /// Opens the database, applies connection settings and ensures the schema
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.database_path)?
        };

        conn.busy_timeout(config.busy_timeout())?;
        let journal_mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_str(),
            |row| row.get(0),
        )?;
        ensure_schema(&conn)?;

        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("database", &config.database_path),
                ("journal_mode", &journal_mode),
            ],
        );

        Ok(Self { conn, config })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreConfig::in_memory())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of every view currently in the catalog, sorted
    pub fn view_names(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'view' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

impl TransactionalEngine for SqliteStore {
    type Unit = Connection;

    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<EngineError>,
    {
        // IMMEDIATE takes the write lock up front so two writers never
        // deadlock upgrading from a shared lock.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(EngineError::from)?;

        let unit: &Connection = &tx;
        match work(unit) {
            Ok(value) => {
                tx.commit().map_err(EngineError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    Logger::warn(
                        "TRANSACTION_ROLLBACK_FAILED",
                        &[("reason", &rollback.to_string())],
                    );
                }
                Err(err)
            }
        }
    }
}

impl IndexStore for SqliteStore {
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

/// Index operations on a bare connection, so they also run inside a
/// transaction opened by `run_in_transaction`.
impl IndexStore for Connection {
    fn append(&self, oid: &str, entries: &[IndexEntry]) -> StoreResult<()> {
        let first_seq: i64 = self.query_row(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM path_index WHERE oid = ?1",
            params![oid],
            |row| row.get(0),
        )?;

        let mut stmt = self.prepare_cached(
            "INSERT INTO path_index
                (oid, seq, path, depth, kind, value_numeric, value_boolean, value_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;

        for (offset, entry) in entries.iter().enumerate() {
            let value = entry.value();
            stmt.execute(params![
                oid,
                first_seq + offset as i64,
                entry.path,
                entry.depth as i64,
                entry.kind().as_str(),
                value.as_f64(),
                value.as_bool(),
                value.as_text(),
            ])?;
        }

        Ok(())
    }

    fn delete(&self, oid: &str) -> StoreResult<usize> {
        let removed = self.execute("DELETE FROM path_index WHERE oid = ?1", params![oid])?;
        Ok(removed)
    }

    fn query_paths(
        &self,
        paths: &[String],
        kind: Option<ValueKind>,
    ) -> StoreResult<Vec<PathRecord>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; paths.len()].join(", ");
        let mut sql = format!(
            "SELECT DISTINCT path, kind FROM path_index WHERE path IN ({})",
            placeholders
        );
        let mut bound: Vec<&str> = paths.iter().map(String::as_str).collect();
        if let Some(kind) = kind {
            sql.push_str(" AND kind = ?");
            bound.push(kind.as_str());
        }
        sql.push_str(" ORDER BY path, kind");

        let mut stmt = self.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bound.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (path, kind_name) = row?;
            let kind = ValueKind::parse(&kind_name).ok_or_else(|| {
                StoreError::corrupt_entry("*", &path, format!("unknown kind '{}'", kind_name))
            })?;
            records.push(PathRecord { path, kind });
        }
        Ok(records)
    }

    fn document_ids(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.prepare("SELECT DISTINCT oid FROM path_index ORDER BY oid")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn entries(&self, oid: &str) -> StoreResult<Vec<IndexEntry>> {
        let mut stmt = self.prepare_cached(
            "SELECT path, depth, kind, value_numeric, value_boolean, value_text
             FROM path_index WHERE oid = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![oid], |row| {
            Ok(StoredRow {
                path: row.get(0)?,
                depth: row.get(1)?,
                kind: row.get(2)?,
                numeric: row.get(3)?,
                boolean: row.get(4)?,
                text: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.decode(oid)?);
        }
        Ok(entries)
    }
}

/// A raw `path_index` row
struct StoredRow {
    path: String,
    depth: i64,
    kind: String,
    numeric: Option<f64>,
    boolean: Option<bool>,
    text: Option<String>,
}

impl StoredRow {
    fn decode(self, oid: &str) -> StoreResult<IndexEntry> {
        let kind = ValueKind::parse(&self.kind).ok_or_else(|| {
            StoreError::corrupt_entry(oid, &self.path, format!("unknown kind '{}'", self.kind))
        })?;
        let depth = usize::try_from(self.depth).map_err(|_| {
            StoreError::corrupt_entry(oid, &self.path, format!("negative depth {}", self.depth))
        })?;

        let value = match kind {
            ValueKind::Float => self.numeric.map(IndexValue::Float),
            ValueKind::Null => Some(IndexValue::Null),
            ValueKind::Boolean => self.boolean.map(IndexValue::Boolean),
            ValueKind::String => self.text.map(IndexValue::String),
            ValueKind::Array => self.text.map(IndexValue::Array),
            ValueKind::Object => self.text.map(IndexValue::Object),
        }
        .ok_or_else(|| {
            StoreError::corrupt_entry(
                oid,
                &self.path,
                format!("{} entry has no value in its storage column", kind),
            )
        })?;

        Ok(IndexEntry::new(self.path, depth, value))
    }
}
