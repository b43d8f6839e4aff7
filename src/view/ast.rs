//! Predicate and ordering structures
//!
//! Defines the path-scoped conditions a view builder accumulates.

use serde_json::Value;

use crate::engine::QueryParam;
use crate::indexer::StorageColumn;

/// Comparison applied to one pivoted path column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// path = value
    Eq(Value),
    /// path <> value
    Ne(Value),
    /// path < value
    Lt(Value),
    /// path <= value
    Lte(Value),
    /// path > value
    Gt(Value),
    /// path >= value
    Gte(Value),
    /// low <= path <= high
    Between(Value, Value),
    /// path < low or path > high
    NotBetween(Value, Value),
    /// path equals one of the values
    In(Vec<Value>),
    /// path equals none of the values
    NotIn(Vec<Value>),
}

impl FilterOp {
    /// Returns the operator name used in query requests
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "=",
            FilterOp::Ne(_) => "<>",
            FilterOp::Lt(_) => "<",
            FilterOp::Lte(_) => "<=",
            FilterOp::Gt(_) => ">",
            FilterOp::Gte(_) => ">=",
            FilterOp::Between(..) => "between",
            FilterOp::NotBetween(..) => "not-between",
            FilterOp::In(_) => "in",
            FilterOp::NotIn(_) => "not-in",
        }
    }

    /// Builds an operator from its request name.
    ///
    /// `between` and `not-between` take a two-element array, `in` and
    /// `not-in` take an array. Returns a reason on failure.
    pub fn parse(name: &str, value: Value) -> Result<Self, String> {
        let op = match name {
            "=" => FilterOp::Eq(value),
            "<>" | "!=" => FilterOp::Ne(value),
            "<" => FilterOp::Lt(value),
            "<=" => FilterOp::Lte(value),
            ">" => FilterOp::Gt(value),
            ">=" => FilterOp::Gte(value),
            "between" | "not-between" => {
                let (low, high) = match value {
                    Value::Array(mut bounds) if bounds.len() == 2 => {
                        let high = bounds.pop().unwrap_or(Value::Null);
                        let low = bounds.pop().unwrap_or(Value::Null);
                        (low, high)
                    }
                    _ => return Err(format!("'{}' expects [low, high]", name)),
                };
                if name == "between" {
                    FilterOp::Between(low, high)
                } else {
                    FilterOp::NotBetween(low, high)
                }
            }
            "in" | "not-in" => {
                let values = match value {
                    Value::Array(values) => values,
                    _ => return Err(format!("'{}' expects an array", name)),
                };
                if name == "in" {
                    FilterOp::In(values)
                } else {
                    FilterOp::NotIn(values)
                }
            }
            other => return Err(format!("unknown operator '{}'", other)),
        };
        Ok(op)
    }

    /// Values this operator binds, in placeholder order
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            FilterOp::Eq(v)
            | FilterOp::Ne(v)
            | FilterOp::Lt(v)
            | FilterOp::Lte(v)
            | FilterOp::Gt(v)
            | FilterOp::Gte(v) => vec![v],
            FilterOp::Between(low, high) | FilterOp::NotBetween(low, high) => vec![low, high],
            FilterOp::In(values) | FilterOp::NotIn(values) => values.iter().collect(),
        }
    }

    /// Storage column the operands compare against.
    ///
    /// `None` when every operand is null. Operands of different kinds are
    /// rejected, since a value only ever compares against its own kind.
    pub(crate) fn operand_storage(&self) -> Result<Option<StorageColumn>, String> {
        let mut storage = None;
        for operand in self.operands() {
            let Some(column) = param_storage(&to_param(operand)?) else {
                continue;
            };
            match storage {
                None => storage = Some(column),
                Some(seen) if seen != column => {
                    return Err(format!(
                        "'{}' operands mix {} and {} values",
                        self.op_name(),
                        seen.as_str(),
                        column.as_str()
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(storage)
    }
}

/// How a predicate joins the chain before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub op: FilterOp,
    /// Ignored for the first predicate
    pub connective: Connective,
}

impl Predicate {
    pub fn new(path: impl Into<String>, op: FilterOp, connective: Connective) -> Self {
        Self {
            path: path.into(),
            op,
            connective,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub path: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }
}

/// Converts a JSON operand to a bound parameter.
///
/// Arrays and objects bind as their canonical JSON text, which is what the
/// index stores for containers.
pub(crate) fn to_param(value: &Value) -> Result<QueryParam, String> {
    let param = match value {
        Value::Null => QueryParam::Null,
        Value::Bool(b) => QueryParam::Boolean(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => QueryParam::Numeric(f),
            _ => return Err(format!("number {} has no finite float representation", n)),
        },
        Value::String(s) => QueryParam::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => QueryParam::Text(value.to_string()),
    };
    Ok(param)
}

/// Storage column a bound value compares against. NULL has none.
pub(crate) fn param_storage(param: &QueryParam) -> Option<StorageColumn> {
    match param {
        QueryParam::Null => None,
        QueryParam::Numeric(_) => Some(StorageColumn::Numeric),
        QueryParam::Boolean(_) => Some(StorageColumn::Boolean),
        QueryParam::Text(_) => Some(StorageColumn::Text),
    }
}
