//! JSON I/O handling for CLI
//!
//! - Input: one JSON document or request, from a file or stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Number, Value};

use super::errors::{CliError, CliResult};
use crate::indexer::{IndexEntry, IndexValue};

/// Reads the whole of `file`, or stdin when no file is given
pub fn read_input(file: Option<&Path>) -> CliResult<String> {
    let text = match file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            text
        }
    };

    if text.trim().is_empty() {
        return Err(CliError::input("Empty input"));
    }
    Ok(text)
}

/// Reads and parses one JSON value
pub fn read_json(file: Option<&Path>) -> CliResult<Value> {
    let text = read_input(file)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write one JSON value as a line to stdout
pub fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// JSON form of an index entry, as printed by `scan`
pub fn entry_json(entry: &IndexEntry) -> Value {
    let value = match entry.value() {
        IndexValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        IndexValue::Null => Value::Null,
        IndexValue::Boolean(b) => Value::Bool(*b),
        IndexValue::String(s) | IndexValue::Array(s) | IndexValue::Object(s) => {
            Value::String(s.clone())
        }
    };

    json!({
        "path": entry.path,
        "depth": entry.depth,
        "kind": entry.kind(),
        "value": value,
    })
}
