//! Document scanner
//!
//! Flattens a JSON tree into index entries, pre-order and depth-first.
//!
//! # Algorithm
//!
//! 1. Seed an explicit work stack with the root's children
//! 2. Pop a node, check its depth, classify it, emit its entry
//! 3. Push its children in reverse so the first child is popped next
//! 4. Once the walk succeeds, fill in the serialized text of every container
//!
//! Containers are serialized only after the whole tree has passed the depth
//! check, so serialization never recurses deeper than `max_depth`.

use serde_json::Value;

use super::entry::{IndexEntry, IndexValue};
use super::errors::{IndexerError, IndexerResult};

/// Default maximum nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A node waiting to be visited
struct Frame<'a> {
    path: String,
    depth: usize,
    node: &'a Value,
}

/// Flattens documents into index entries.
///
/// Holds no state between scans; a single indexer can be shared across
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct PathIndexer {
    max_depth: usize,
}

impl Default for PathIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl PathIndexer {
    /// Creates an indexer that rejects entries deeper than `max_depth`
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Scans a document into its ordered entry sequence.
    ///
    /// The root itself has no entry. A scalar root therefore yields no
    /// entries. Any failure discards everything scanned so far.
    pub fn scan(&self, document: &Value) -> IndexerResult<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        let mut containers: Vec<(usize, &Value)> = Vec::new();
        let mut stack: Vec<Frame<'_>> = Vec::new();

        push_children(&mut stack, document, "", 0);

        while let Some(frame) = stack.pop() {
            if frame.depth > self.max_depth {
                return Err(IndexerError::depth_exceeded(frame.path, self.max_depth));
            }

            let value = classify(&frame.path, frame.node)?;
            if value.kind().is_container() {
                containers.push((entries.len(), frame.node));
                push_children(&mut stack, frame.node, &frame.path, frame.depth + 1);
            }

            entries.push(IndexEntry::new(frame.path, frame.depth, value));
        }

        for (position, node) in containers {
            let entry = &mut entries[position];
            let text = serde_json::to_string(node)
                .map_err(|e| IndexerError::unsupported_type(entry.path.clone(), e.to_string()))?;
            match &mut entry.value {
                IndexValue::Array(slot) | IndexValue::Object(slot) => *slot = text,
                _ => {}
            }
        }

        Ok(entries)
    }
}

/// Scans with the default maximum depth
pub fn scan(document: &Value) -> IndexerResult<Vec<IndexEntry>> {
    PathIndexer::default().scan(document)
}

/// Maps a node to its typed value. Container text is filled in later.
fn classify(path: &str, node: &Value) -> IndexerResult<IndexValue> {
    let value = match node {
        Value::Null => IndexValue::Null,
        Value::Bool(b) => IndexValue::Boolean(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => IndexValue::Float(f),
            _ => {
                return Err(IndexerError::unsupported_type(
                    path,
                    format!("number {} has no finite float representation", n),
                ))
            }
        },
        Value::String(s) => IndexValue::String(s.clone()),
        Value::Array(_) => IndexValue::Array(String::new()),
        Value::Object(_) => IndexValue::Object(String::new()),
    };
    Ok(value)
}

fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Pushes a container's children in reverse natural order
fn push_children<'a>(stack: &mut Vec<Frame<'a>>, node: &'a Value, prefix: &str, depth: usize) {
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter().rev() {
                stack.push(Frame {
                    path: child_path(prefix, key),
                    depth,
                    node: child,
                });
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate().rev() {
                stack.push(Frame {
                    path: child_path(prefix, &index.to_string()),
                    depth,
                    node: child,
                });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::ValueKind;
    use serde_json::json;

    fn summary(entries: &[IndexEntry]) -> Vec<(ValueKind, String, usize)> {
        entries
            .iter()
            .map(|e| (e.kind(), e.path.clone(), e.depth))
            .collect()
    }

    #[test]
    fn test_flat_object_in_key_order() {
        let entries = scan(&json!({"name": "jason bourne", "category": "agent"})).unwrap();

        assert_eq!(
            entries,
            vec![
                IndexEntry::new("name", 0, IndexValue::String("jason bourne".into())),
                IndexEntry::new("category", 0, IndexValue::String("agent".into())),
            ]
        );
    }

    #[test]
    fn test_nested_object() {
        let entries = scan(&json!({"a": {"b": 1}})).unwrap();

        assert_eq!(
            entries,
            vec![
                IndexEntry::new("a", 0, IndexValue::Object(r#"{"b":1}"#.into())),
                IndexEntry::new("a.b", 1, IndexValue::Float(1.0)),
            ]
        );
    }

    #[test]
    fn test_preorder_siblings_after_subtree() {
        let doc = json!({"a": {"b": [true, null]}, "c": 2.5});
        let entries = scan(&doc).unwrap();

        assert_eq!(
            summary(&entries),
            vec![
                (ValueKind::Object, "a".to_string(), 0),
                (ValueKind::Array, "a.b".to_string(), 1),
                (ValueKind::Boolean, "a.b.0".to_string(), 2),
                (ValueKind::Null, "a.b.1".to_string(), 2),
                (ValueKind::Float, "c".to_string(), 0),
            ]
        );
        assert_eq!(entries[1].value, IndexValue::Array("[true,null]".into()));
    }

    #[test]
    fn test_array_root_uses_indices() {
        let entries = scan(&json!(["x", {"y": false}])).unwrap();

        assert_eq!(
            summary(&entries),
            vec![
                (ValueKind::String, "0".to_string(), 0),
                (ValueKind::Object, "1".to_string(), 0),
                (ValueKind::Boolean, "1.y".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_scalar_root_has_no_entries() {
        assert!(scan(&json!(42)).unwrap().is_empty());
        assert!(scan(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_integers_collapse_to_float() {
        let entries = scan(&json!({"n": 7, "m": -3})).unwrap();
        assert_eq!(entries[0].value, IndexValue::Float(7.0));
        assert_eq!(entries[1].value, IndexValue::Float(-3.0));
    }

    #[test]
    fn test_depth_exceeded() {
        let indexer = PathIndexer::new(1);
        let doc = json!({"a": {"b": {"c": 1}}});

        let err = indexer.scan(&doc).unwrap_err();
        assert_eq!(err, IndexerError::depth_exceeded("a.b.c", 1));
    }

    #[test]
    fn test_depth_at_limit_is_allowed() {
        let indexer = PathIndexer::new(1);
        let entries = indexer.scan(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_deep_document_fails_without_overflow() {
        let mut doc = json!(1);
        for _ in 0..1_000 {
            doc = json!({ "n": doc });
        }

        let err = scan(&doc).unwrap_err();
        assert_eq!(err.code(), "PATHDB_DEPTH_EXCEEDED");
    }

    #[test]
    fn test_keys_with_dots_are_kept_verbatim() {
        let entries = scan(&json!({"a.b": {"c": 1}})).unwrap();
        assert_eq!(entries[1].path, "a.b.c");
    }
}
