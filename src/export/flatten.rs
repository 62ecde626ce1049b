//! Record flattening: nested JSON records into single-line CSV cells

use crate::models::Record;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is valid"));

/// How a column's value is rendered into a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: entity-encoded, line breaks escaped
    Text,
    /// List of strings joined with `,`, then treated as text
    TextList,
    /// Nested structure serialized as compact JSON, never entity-encoded
    Json,
    /// Booleans and numbers, written as-is
    Raw,
}

/// A declared output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Field name in the (possibly enriched) record
    pub id: &'static str,
    /// Header title written to the CSV
    pub title: &'static str,
    pub kind: FieldKind,
}

impl Column {
    pub const fn new(id: &'static str, title: &'static str, kind: FieldKind) -> Self {
        Self { id, title, kind }
    }
}

/// One flattened output row, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(&'static str, String)>,
}

impl Row {
    /// Cell value for a column id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(column, _)| *column == id)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell values in header order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }
}

/// Flattens a record against a fixed column list. Never fails: missing fields become empty cells.
pub fn flatten(record: &Record, columns: &[Column]) -> Row {
    let cells = columns
        .iter()
        .map(|column| (column.id, render(record.get(column.id), column.kind)))
        .collect();
    Row { cells }
}

fn render(value: Option<&Value>, kind: FieldKind) -> String {
    let value = match value {
        None | Some(Value::Null) => return String::new(),
        Some(v) => v,
    };

    match kind {
        FieldKind::Text | FieldKind::TextList => flatten_text(&plain_text(value)),
        FieldKind::Json => value.to_string(),
        FieldKind::Raw => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Best-effort textual form of a value before encoding
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Entity-encodes a string and escapes every run of line breaks as a literal `\n`
pub fn flatten_text(s: &str) -> String {
    let encoded = html_escape::encode_quoted_attribute(s);
    LINE_BREAKS.replace_all(&encoded, r"\n").into_owned()
}
