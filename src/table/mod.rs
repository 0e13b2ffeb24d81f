//! Row/column data model shared by every operator and aggregator.
//!
//! A table is an ordered sequence of rows; a row maps column names to JSON
//! cell values. Rows need not share identical key sets: a missing key means
//! the cell is absent, which is distinct from an empty string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row: column name -> cell value.
///
/// `serde_json::Map` is backed by an insertion-ordered map (the
/// `preserve_order` feature), so source column order survives parsing.
pub type Row = serde_json::Map<String, Value>;

/// An ordered sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in display order.
    ///
    /// Order is taken from the first row's keys; keys that only appear in
    /// later rows (sparse tables) are appended in first-seen order so that
    /// no column is lost on export.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Cell lookup; `None` means the key is absent from the row.
    pub fn cell<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
        row.get(column)
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

/// Best-effort numeric coercion, shared by filter, sort and aggregation.
///
/// A cell is numeric when it is present, non-empty and converts the way a
/// spreadsheet formula would: numbers as-is, booleans as 0/1, strings via a
/// trimmed parse. A whitespace-only string is non-empty and coerces to 0,
/// like `Number(" ")`. Everything else (absent, null, the empty string or
/// non-numeric text) is NotNumeric and the caller picks its own fallback.
pub fn parse_numeric(cell: Option<&Value>) -> Option<f64> {
    match cell? {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            if s.is_empty() {
                return None;
            }
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0.0);
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// String form of a cell, for key building and substring matching.
/// Absent cells, nulls, arrays and objects have no string form.
pub fn cell_text(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a cell holds an actual value: present, non-null and not the
/// empty string. Whitespace-only strings count as present.
pub fn is_present(cell: Option<&Value>) -> bool {
    match cell {
        Some(Value::Null) | None => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
