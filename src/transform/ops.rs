//! Row transform operators.
//!
//! Six declarative operations that each map a table plus parameters to a new
//! table. Operators are pure: untargeted columns pass through untouched and
//! the input table is never mutated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{OperationError, OperationResult};
use crate::table::{cell_text, parse_numeric, Row, Table};

/// Separator used when building composite keys from several columns.
/// Not expected to appear inside key data.
pub const KEY_SEPARATOR: &str = "|";

/// All available row transformations.
///
/// The wire format matches the JSON produced by the web UI:
/// `{"type": "removeDuplicates", "columns": ["name"]}` and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Keep the first row for each composite key over the named columns.
    RemoveDuplicates { columns: Vec<String> },

    /// Strip leading/trailing whitespace from string cells.
    TrimSpaces { columns: Vec<String> },

    /// Upper/lower-case string cells.
    ChangeCase { columns: Vec<String>, case_type: CaseType },

    /// Global regex replacement on one column's string cells.
    FindReplace {
        column: String,
        find: String,
        #[serde(default)]
        replace: String,
    },

    /// Keep rows satisfying a predicate on one column.
    #[serde(rename = "filterData", alias = "filter")]
    Filter {
        column: String,
        operator: FilterOperator,
        value: String,
    },

    /// Stable sort on one column's raw cell values.
    #[serde(rename = "sortData", alias = "sort")]
    Sort {
        column: String,
        direction: SortDirection,
    },
}

/// Case conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Upper,
    Lower,
}

/// Filter predicates.
///
/// Unrecognized operators deserialize to [`FilterOperator::Unknown`], which
/// keeps every row. The filter stays permissive instead of failing a whole
/// pipeline run over a typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equals,
    Contains,
    Greater,
    Less,
    #[serde(other)]
    Unknown,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Operation {
    /// Apply this operation, producing a new table.
    pub fn apply(&self, table: &Table) -> OperationResult<Table> {
        match self {
            Operation::RemoveDuplicates { columns } => apply_remove_duplicates(table, columns),
            Operation::TrimSpaces { columns } => Ok(apply_trim_spaces(table, columns)),
            Operation::ChangeCase { columns, case_type } => {
                Ok(apply_change_case(table, columns, *case_type))
            }
            Operation::FindReplace { column, find, replace } => {
                apply_find_replace(table, column, find, replace)
            }
            Operation::Filter { column, operator, value } => {
                Ok(apply_filter(table, column, *operator, value))
            }
            Operation::Sort { column, direction } => Ok(apply_sort(table, column, *direction)),
        }
    }

    /// Short human-readable label, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RemoveDuplicates { .. } => "removeDuplicates",
            Operation::TrimSpaces { .. } => "trimSpaces",
            Operation::ChangeCase { .. } => "changeCase",
            Operation::FindReplace { .. } => "findReplace",
            Operation::Filter { .. } => "filterData",
            Operation::Sort { .. } => "sortData",
        }
    }
}

/// Composite key over the named columns. Absent cells and nulls contribute
/// an empty segment, so rows missing a key column can still collide.
fn composite_key(row: &Row, columns: &[String]) -> String {
    columns
        .iter()
        .map(|col| cell_text(row.get(col)).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

fn apply_remove_duplicates(table: &Table, columns: &[String]) -> OperationResult<Table> {
    if columns.is_empty() {
        return Err(OperationError::InvalidOperation(
            "removeDuplicates requires at least one column".into(),
        ));
    }

    let mut seen = HashSet::new();
    let rows = table
        .rows()
        .iter()
        .filter(|row| seen.insert(composite_key(row, columns)))
        .cloned()
        .collect();
    Ok(Table::from_rows(rows))
}

/// Rewrite string cells in the named columns; other cell types pass through.
fn map_string_cells<F>(table: &Table, columns: &[String], f: F) -> Table
where
    F: Fn(&str) -> String,
{
    table
        .rows()
        .iter()
        .map(|row| {
            let mut new_row = row.clone();
            for col in columns {
                if let Some(Value::String(s)) = row.get(col) {
                    new_row.insert(col.clone(), Value::String(f(s)));
                }
            }
            new_row
        })
        .collect()
}

fn apply_trim_spaces(table: &Table, columns: &[String]) -> Table {
    map_string_cells(table, columns, |s| s.trim().to_string())
}

fn apply_change_case(table: &Table, columns: &[String], case_type: CaseType) -> Table {
    map_string_cells(table, columns, |s| match case_type {
        CaseType::Upper => s.to_uppercase(),
        CaseType::Lower => s.to_lowercase(),
    })
}

fn apply_find_replace(
    table: &Table,
    column: &str,
    find: &str,
    replace: &str,
) -> OperationResult<Table> {
    let re = regex::Regex::new(find).map_err(|e| OperationError::InvalidPattern {
        pattern: find.to_string(),
        message: e.to_string(),
    })?;

    let columns = [column.to_string()];
    Ok(map_string_cells(table, &columns, |s| {
        re.replace_all(s, replace).to_string()
    }))
}

fn apply_filter(table: &Table, column: &str, operator: FilterOperator, value: &str) -> Table {
    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            let cell = row.get(column);
            match operator {
                FilterOperator::Equals => loose_eq(cell, value),
                FilterOperator::Contains => {
                    cell_text(cell).map(|s| s.contains(value)).unwrap_or(false)
                }
                FilterOperator::Greater => match (parse_numeric(cell), numeric_param(value)) {
                    (Some(lhs), Some(rhs)) => lhs > rhs,
                    _ => false,
                },
                FilterOperator::Less => match (parse_numeric(cell), numeric_param(value)) {
                    (Some(lhs), Some(rhs)) => lhs < rhs,
                    _ => false,
                },
                FilterOperator::Unknown => true,
            }
        })
        .cloned()
        .collect();
    Table::from_rows(rows)
}

fn apply_sort(table: &Table, column: &str, direction: SortDirection) -> Table {
    let mut rows: Vec<Row> = table.rows().to_vec();
    // sort_by is stable, so equal keys keep their original relative order.
    rows.sort_by(|a, b| {
        let ord = compare_cells(a.get(column), b.get(column));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    Table::from_rows(rows)
}

/// Numeric form of the filter parameter, `Number()`-style: an empty or
/// whitespace-only parameter counts as zero, unparseable text as no match.
fn numeric_param(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok()
}

/// Spreadsheet-style numeric conversion where empty strings count as zero
/// and unparseable text as NaN. Only used by loose equality and mixed-type
/// sorting, which replicate the original UI's comparison semantics.
fn js_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Loose equality between a cell and a string parameter: strings compare
/// textually, numbers and booleans compare through their numeric form
/// (so `5 == "5"` holds), null and absent cells never match.
fn loose_eq(cell: Option<&Value>, value: &str) -> bool {
    match cell {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.as_f64().map(|x| x == js_number(value)).unwrap_or(false),
        Some(Value::Bool(b)) => (if *b { 1.0 } else { 0.0 }) == js_number(value),
        _ => false,
    }
}

/// Native ordering on raw cell values: two strings compare lexicographically,
/// every other pairing goes through numeric conversion. Incomparable pairs
/// (NaN on either side) count as equal so a stable sort leaves them in place.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if let (Some(Value::String(x)), Some(Value::String(y))) = (a, b) {
        return x.cmp(y);
    }

    let xa = sort_number(a);
    let xb = sort_number(b);
    xa.partial_cmp(&xb).unwrap_or(Ordering::Equal)
}

fn sort_number(cell: Option<&Value>) -> f64 {
    match cell {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => js_number(s),
        _ => f64::NAN,
    }
}

/// Reference listing of the available operations, shown by the CLI.
pub fn operations_description() -> String {
    r#"Available row operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| removeDuplicates | Keep first row per composite key | columns: key columns (at least one) |
| trimSpaces | Strip leading/trailing whitespace | columns: target columns |
| changeCase | Upper/lower-case string cells | columns: target columns, caseType: "upper" or "lower" |
| findReplace | Global regex replacement | column: target column, find: regex, replace: replacement |
| filterData | Keep matching rows | column, operator: equals/contains/greater/less, value |
| sortData | Stable sort on one column | column, direction: "asc" or "desc" |

Example operation list in JSON:
[
  {"type": "trimSpaces", "columns": ["name"]},
  {"type": "removeDuplicates", "columns": ["name", "email"]},
  {"type": "findReplace", "column": "phone", "find": "[-. ]", "replace": ""},
  {"type": "filterData", "column": "age", "operator": "greater", "value": "18"},
  {"type": "sortData", "column": "age", "direction": "desc"}
]"#
    .to_string()
}
