//! JSON query requests
//!
//! Wire form accepted by `pathdb find`:
//!
//! ```json
//! {
//!   "where": [
//!     {"path": "age", "op": ">=", "value": 18},
//!     {"path": "tags.0", "op": "in", "value": ["red", "blue"], "or": true}
//!   ],
//!   "order": [{"path": "name", "direction": "desc"}]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::ast::{FilterOp, SortDirection};
use super::builder::ViewBuilder;
use super::errors::{QueryError, QueryResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    #[serde(default, rename = "where")]
    pub predicates: Vec<PredicateRequest>,
    #[serde(default, rename = "order")]
    pub orderings: Vec<OrderingRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredicateRequest {
    pub path: String,
    pub op: String,
    #[serde(default)]
    pub value: Value,
    /// OR-combine with the chain so far instead of AND
    #[serde(default)]
    pub or: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderingRequest {
    pub path: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "asc".to_string()
}

impl QueryRequest {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Replays the request onto a builder, in request order
    pub fn apply(self, builder: &mut ViewBuilder) -> QueryResult<()> {
        for predicate in self.predicates {
            let op = FilterOp::parse(&predicate.op, predicate.value)
                .map_err(|reason| QueryError::invalid_predicate(&predicate.path, reason))?;
            if predicate.or {
                builder.add_or_predicate(predicate.path, op)?;
            } else {
                builder.add_predicate(predicate.path, op)?;
            }
        }

        for ordering in self.orderings {
            let direction = SortDirection::parse(&ordering.direction).ok_or_else(|| {
                QueryError::invalid_predicate(
                    &ordering.path,
                    format!("unknown sort direction '{}'", ordering.direction),
                )
            })?;
            builder.add_ordering(ordering.path, direction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Connective;

    #[test]
    fn test_request_applies_in_order() {
        let request = QueryRequest::from_json(
            r#"{
                "where": [
                    {"path": "age", "op": "between", "value": [18, 30]},
                    {"path": "name", "op": "=", "value": "ann", "or": true}
                ],
                "order": [{"path": "name", "direction": "desc"}, {"path": "age"}]
            }"#,
        )
        .unwrap();

        let mut builder = ViewBuilder::new();
        request.apply(&mut builder).unwrap();

        let predicates = builder.predicates();
        assert_eq!(predicates[0].op, FilterOp::Between(18.into(), 30.into()));
        assert_eq!(predicates[1].connective, Connective::Or);
        assert_eq!(builder.orderings()[0].direction, SortDirection::Descending);
        assert_eq!(builder.orderings()[1].direction, SortDirection::Ascending);
    }

    #[test]
    fn test_empty_request() {
        let request = QueryRequest::from_json("{}").unwrap();
        let mut builder = ViewBuilder::new();
        request.apply(&mut builder).unwrap();
        assert!(builder.referenced_paths().is_empty());
    }

    #[test]
    fn test_bad_operator_and_direction() {
        let mut builder = ViewBuilder::new();
        let err = QueryRequest::from_json(r#"{"where": [{"path": "a", "op": "~", "value": 1}]}"#)
            .unwrap()
            .apply(&mut builder)
            .unwrap_err();
        assert_eq!(err.code(), "PATHDB_INVALID_PREDICATE");

        let err = QueryRequest::from_json(r#"{"order": [{"path": "a", "direction": "up"}]}"#)
            .unwrap()
            .apply(&mut builder)
            .unwrap_err();
        assert_eq!(err.code(), "PATHDB_INVALID_PREDICATE");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(QueryRequest::from_json(r#"{"limit": 3}"#).is_err());
    }
}
