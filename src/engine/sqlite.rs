//! SQLite implementation of the execution seam

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};

use super::{EngineResult, QueryParam, SqlEngine};
use crate::view::quote_identifier;

impl From<&QueryParam> for SqlValue {
    fn from(param: &QueryParam) -> Self {
        match param {
            QueryParam::Null => SqlValue::Null,
            QueryParam::Numeric(n) => SqlValue::Real(*n),
            QueryParam::Boolean(b) => SqlValue::Integer(i64::from(*b)),
            QueryParam::Text(s) => SqlValue::Text(s.clone()),
        }
    }
}

impl SqlEngine for Connection {
    fn create_view(&self, name: &str, definition: &str) -> EngineResult<()> {
        let sql = format!("CREATE VIEW {} AS {}", quote_identifier(name), definition);
        self.execute_batch(&sql)?;
        Ok(())
    }

    fn drop_view_if_exists(&self, name: &str) -> EngineResult<()> {
        let sql = format!("DROP VIEW IF EXISTS {}", quote_identifier(name));
        self.execute_batch(&sql)?;
        Ok(())
    }

    fn run_query(&self, sql: &str, params: &[QueryParam]) -> EngineResult<Vec<String>> {
        let mut stmt = self.prepare(sql)?;
        let values: Vec<SqlValue> = params.iter().map(SqlValue::from).collect();
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn view_exists(&self, name: &str) -> EngineResult<bool> {
        let count: i64 = self.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'view' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE docs (oid TEXT, score REAL);
             INSERT INTO docs VALUES ('a', 1.0), ('b', 2.0), ('c', 3.0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_view_create_and_drop() {
        let conn = conn();

        conn.create_view("v_test", "SELECT oid FROM docs").unwrap();
        assert!(conn.view_exists("v_test").unwrap());

        conn.drop_view_if_exists("v_test").unwrap();
        assert!(!conn.view_exists("v_test").unwrap());

        // Dropping again is not an error
        conn.drop_view_if_exists("v_test").unwrap();
    }

    #[test]
    fn test_run_query_binds_params() {
        let conn = conn();

        let ids = conn
            .run_query(
                "SELECT oid FROM docs WHERE score >= ?1 ORDER BY oid",
                &[QueryParam::Numeric(2.0)],
            )
            .unwrap();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_param_conversion() {
        assert_eq!(SqlValue::from(&QueryParam::Boolean(true)), SqlValue::Integer(1));
        assert_eq!(SqlValue::from(&QueryParam::Null), SqlValue::Null);
        assert_eq!(
            SqlValue::from(&QueryParam::Text("x".into())),
            SqlValue::Text("x".into())
        );
    }
}
