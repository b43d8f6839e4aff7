//! Pivot view SQL generation
//!
//! The view has one row per indexed document and, per referenced path, one
//! column for each storage column the path has been recorded in:
//!
//! ```sql
//! SELECT anchor.oid AS oid,
//!        p0.value_numeric AS "path:age#numeric",
//!        p0.value_text AS "path:age#text", ...
//! FROM (SELECT DISTINCT oid FROM path_index) AS anchor
//! LEFT JOIN (
//!     SELECT oid, MIN(value_numeric) AS value_numeric, MIN(value_text) AS value_text
//!     FROM path_index
//!     WHERE path = 'age' AND (value_numeric IS NOT NULL OR value_text IS NOT NULL)
//!     GROUP BY oid
//! ) AS p0 ON p0.oid = anchor.oid
//! ...
//! ```
//!
//! A predicate compares against the one column matching its operands' kind,
//! so `age >= 18` never sees a string `age` and `age = 1` never sees `true`.
//! A document whose value has another kind behaves as if the path were
//! missing.
//!
//! Identifiers and path literals are only ever built from paths the store has
//! confirmed exist. They are still quoted, since a confirmed path can contain
//! any character a JSON key can. Predicate values never appear in SQL text;
//! they are bound parameters of the selection query.

use super::ast::{to_param, FilterOp, Predicate, SortSpec};
use super::errors::{QueryError, QueryResult};
use crate::engine::QueryParam;
use crate::indexer::StorageColumn;
use crate::store::INDEX_TABLE;

/// Name of the document id column in every pivot view
pub const OID_COLUMN: &str = "oid";

/// Double-quotes an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quotes a string literal, doubling embedded quotes
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// View column holding a path's values of one storage kind.
///
/// The prefix keeps path columns apart from the `oid` column. The kind
/// follows the last `#`, so distinct `(path, kind)` pairs never share a name.
pub fn path_column(path: &str, storage: StorageColumn) -> String {
    format!("path:{}#{}", path, storage.as_str())
}

/// A validated path and the storage columns its recorded kinds use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotColumn {
    pub path: String,
    pub storage: Vec<StorageColumn>,
}

impl PivotColumn {
    /// Quoted view column for `storage`, if the path has one
    fn column(&self, storage: StorageColumn) -> Option<String> {
        self.storage
            .contains(&storage)
            .then(|| quote_identifier(&path_column(&self.path, storage)))
    }

    fn sub_projection(&self, alias: &str) -> String {
        let aggregates: Vec<String> = self
            .storage
            .iter()
            .map(|s| format!("MIN({name}) AS {name}", name = s.column_name()))
            .collect();
        let present: Vec<String> = self
            .storage
            .iter()
            .map(|s| format!("{} IS NOT NULL", s.column_name()))
            .collect();

        format!(
            "LEFT JOIN (SELECT {oid}, {aggregates} FROM {table} \
             WHERE path = {path} AND ({present}) GROUP BY {oid}) \
             AS {alias} ON {alias}.{oid} = anchor.{oid}",
            oid = OID_COLUMN,
            aggregates = aggregates.join(", "),
            table = INDEX_TABLE,
            path = quote_literal(&self.path),
            present = present.join(" OR "),
            alias = alias,
        )
    }
}

/// Builds the pivot view body for the given columns
pub fn pivot_definition(columns: &[PivotColumn]) -> String {
    let mut select = vec![format!("anchor.{oid} AS {oid}", oid = OID_COLUMN)];
    let mut joins = Vec::with_capacity(columns.len());

    for (i, column) in columns.iter().enumerate() {
        let alias = format!("p{}", i);
        for storage in &column.storage {
            select.push(format!(
                "{}.{} AS {}",
                alias,
                storage.column_name(),
                quote_identifier(&path_column(&column.path, *storage))
            ));
        }
        joins.push(column.sub_projection(&alias));
    }

    let mut sql = format!(
        "SELECT {} FROM (SELECT DISTINCT {oid} FROM {table}) AS anchor",
        select.join(", "),
        oid = OID_COLUMN,
        table = INDEX_TABLE,
    );
    for join in joins {
        sql.push(' ');
        sql.push_str(&join);
    }
    sql
}

/// Final query over a materialized view
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSelection {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Builds `SELECT oid FROM <view> WHERE <chain> ORDER BY <orderings>`.
///
/// The chain is evaluated strictly left to right: every new term wraps
/// everything before it, so `a AND b OR c AND d` becomes
/// `(((a) AND (b)) OR (c)) AND (d)`.
///
/// An ordering sorts by each of the path's storage columns in turn, values
/// of a kind grouped together and documents missing the path last.
pub fn selection(
    view_name: &str,
    columns: &[PivotColumn],
    predicates: &[Predicate],
    orderings: &[SortSpec],
) -> QueryResult<CompiledSelection> {
    let mut params = Vec::new();
    let mut sql = format!(
        "SELECT {} FROM {}",
        quote_identifier(OID_COLUMN),
        quote_identifier(view_name)
    );

    let mut chain: Option<String> = None;
    for predicate in predicates {
        let column = pivot_column(columns, &predicate.path)?;
        let term = render_term(predicate, column, &mut params)?;
        chain = Some(match chain {
            None => term,
            Some(prior) => format!("({}) {} ({})", prior, predicate.connective.as_sql(), term),
        });
    }
    if let Some(chain) = chain {
        sql.push_str(" WHERE ");
        sql.push_str(&chain);
    }

    let mut terms = Vec::new();
    for ordering in orderings {
        let column = pivot_column(columns, &ordering.path)?;
        for storage in &column.storage {
            let name = quote_identifier(&path_column(&column.path, *storage));
            terms.push(format!("{} IS NULL", name));
            terms.push(format!("{} {}", name, ordering.direction.as_sql()));
        }
    }
    if !terms.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));
    }

    Ok(CompiledSelection { sql, params })
}

fn pivot_column<'c>(columns: &'c [PivotColumn], path: &str) -> QueryResult<&'c PivotColumn> {
    columns
        .iter()
        .find(|c| c.path == path)
        .ok_or_else(|| QueryError::unknown_path(path))
}

/// Renders one predicate against the column of its operands' kind.
///
/// When the path was never recorded with that kind the column is the
/// literal `NULL`, so the term matches nothing.
fn render_term(
    predicate: &Predicate,
    column: &PivotColumn,
    params: &mut Vec<QueryParam>,
) -> QueryResult<String> {
    let invalid = |reason: String| QueryError::invalid_predicate(&predicate.path, reason);

    let storage = predicate.op.operand_storage().map_err(invalid)?;
    for operand in predicate.op.operands() {
        params.push(to_param(operand).map_err(invalid)?);
    }

    let column = storage
        .and_then(|s| column.column(s))
        .unwrap_or_else(|| "NULL".to_string());

    let term = match &predicate.op {
        FilterOp::Eq(_) => format!("{} = ?", column),
        FilterOp::Ne(_) => format!("{} <> ?", column),
        FilterOp::Lt(_) => format!("{} < ?", column),
        FilterOp::Lte(_) => format!("{} <= ?", column),
        FilterOp::Gt(_) => format!("{} > ?", column),
        FilterOp::Gte(_) => format!("{} >= ?", column),
        FilterOp::Between(..) => format!("{} BETWEEN ? AND ?", column),
        FilterOp::NotBetween(..) => format!("{} NOT BETWEEN ? AND ?", column),
        FilterOp::In(values) => format!("{} IN ({})", column, placeholders(values.len())),
        FilterOp::NotIn(values) => {
            format!("{} NOT IN ({})", column, placeholders(values.len()))
        }
    };
    Ok(term)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
