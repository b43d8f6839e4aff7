//! Index entry types
//!
//! An entry is one flattened tree node: where it lives (path, depth) and what
//! it holds (a typed value). The kind and the value travel together in
//! `IndexValue`, so an entry can never carry a kind it has no value for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six kinds of JSON value the index can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Null,
    Boolean,
    String,
    Array,
    Object,
}

/// Relational column a kind is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageColumn {
    /// REAL column
    Numeric,
    /// INTEGER 0/1 column
    Boolean,
    /// TEXT column
    Text,
}

impl StorageColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageColumn::Numeric => "numeric",
            StorageColumn::Boolean => "boolean",
            StorageColumn::Text => "text",
        }
    }

    /// Column name in the `path_index` table
    pub fn column_name(&self) -> &'static str {
        match self {
            StorageColumn::Numeric => "value_numeric",
            StorageColumn::Boolean => "value_boolean",
            StorageColumn::Text => "value_text",
        }
    }
}

impl ValueKind {
    /// All kinds, in declaration order
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Float,
        ValueKind::Null,
        ValueKind::Boolean,
        ValueKind::String,
        ValueKind::Array,
        ValueKind::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    /// Parses the stored kind name. Returns None for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Column this kind's values are written to.
    ///
    /// Must stay in sync with `IndexValue`: a `null` entry has no value, so
    /// the text column it maps to is always NULL for it.
    pub fn storage_column(&self) -> StorageColumn {
        match self {
            ValueKind::Float => StorageColumn::Numeric,
            ValueKind::Boolean => StorageColumn::Boolean,
            ValueKind::Null | ValueKind::String | ValueKind::Array | ValueKind::Object => {
                StorageColumn::Text
            }
        }
    }

    /// Returns true for `array` and `object`
    pub fn is_container(&self) -> bool {
        matches!(self, ValueKind::Array | ValueKind::Object)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed index value.
///
/// Containers hold the canonical JSON text of their whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Float(f64),
    Null,
    Boolean(bool),
    String(String),
    Array(String),
    Object(String),
}

impl IndexValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            IndexValue::Float(_) => ValueKind::Float,
            IndexValue::Null => ValueKind::Null,
            IndexValue::Boolean(_) => ValueKind::Boolean,
            IndexValue::String(_) => ValueKind::String,
            IndexValue::Array(_) => ValueKind::Array,
            IndexValue::Object(_) => ValueKind::Object,
        }
    }

    /// Numeric payload, if this is a `float`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndexValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload, if this is a `boolean`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IndexValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text payload for `string`, `array` and `object`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            IndexValue::String(s) | IndexValue::Array(s) | IndexValue::Object(s) => Some(s),
            _ => None,
        }
    }
}

/// One flattened node of a document
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Dotted key path from the root
    pub path: String,
    /// 0 for the root's immediate children
    pub depth: usize,
    /// Typed value
    pub value: IndexValue,
}

impl IndexEntry {
    pub fn new(path: impl Into<String>, depth: usize, value: IndexValue) -> Self {
        Self {
            path: path.into(),
            depth,
            value,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    pub fn value(&self) -> &IndexValue {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ValueKind::parse("integer"), None);
    }

    #[test]
    fn test_storage_column_mapping() {
        assert_eq!(ValueKind::Float.storage_column(), StorageColumn::Numeric);
        assert_eq!(ValueKind::Boolean.storage_column(), StorageColumn::Boolean);
        assert_eq!(ValueKind::Null.storage_column(), StorageColumn::Text);
        assert_eq!(ValueKind::String.storage_column(), StorageColumn::Text);
        assert_eq!(ValueKind::Array.storage_column(), StorageColumn::Text);
        assert_eq!(ValueKind::Object.storage_column(), StorageColumn::Text);
    }

    #[test]
    fn test_storage_column_names() {
        assert_eq!(StorageColumn::Numeric.as_str(), "numeric");
        assert_eq!(StorageColumn::Text.column_name(), "value_text");
    }

    #[test]
    fn test_value_payloads() {
        assert_eq!(IndexValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(IndexValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(IndexValue::Object("{}".into()).as_text(), Some("{}"));
        assert_eq!(IndexValue::Null.as_text(), None);
        assert!(IndexValue::Array("[]".into()).kind().is_container());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ValueKind::Boolean).unwrap();
        assert_eq!(json, "\"boolean\"");
    }
}
