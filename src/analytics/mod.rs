//! Aggregation engine: summary statistics, group-by and pivot tables.
//!
//! Shares the table model's numeric coercion with the filter and sort
//! operators so the same cell is "numeric" everywhere. Coercion failure is
//! soft throughout: non-numeric cells drop out of summary stats and count
//! as 0 in group-by/pivot buckets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::table::{cell_text, is_present, parse_numeric, Table};
use crate::transform::ops::KEY_SEPARATOR;

/// Aggregation applied to a bucket of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl Aggregation {
    /// Reduce a bucket to a single number. Empty buckets reduce to 0.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Count => values.len() as f64,
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl std::str::FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" => Ok(Aggregation::Avg),
            "count" => Ok(Aggregation::Count),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            other => Err(format!("Unknown aggregation: {}", other)),
        }
    }
}

/// Per-column summary statistics.
///
/// The numeric block (`min`/`max`/`avg`/`sum`) is present only when at least
/// one present value coerces to a number, and covers only those values;
/// non-numeric present values still count toward `count` and `unique`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    /// Rows where the cell is present and non-empty.
    pub count: usize,
    /// Distinct present values (type-sensitive: the number 5 and the
    /// string "5" are different values).
    pub unique: usize,
    /// Total rows minus `count`.
    pub null_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
}

/// Pivot table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Columns whose values form the row key.
    pub rows: Vec<String>,
    /// Columns whose values form the column key; may be empty.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Columns whose coerced numbers feed the buckets.
    pub values: Vec<String>,
    pub aggregation: Aggregation,
}

/// Nested pivot result: row key -> column key -> aggregate.
pub type PivotTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Compute summary statistics for every column of the table.
pub fn summarize(table: &Table) -> BTreeMap<String, ColumnSummary> {
    let total = table.len();
    let mut summary = BTreeMap::new();

    for column in table.columns() {
        let mut count = 0usize;
        let mut distinct: BTreeSet<String> = BTreeSet::new();
        let mut numeric: Vec<f64> = Vec::new();

        for row in table.rows() {
            let cell = row.get(&column);
            if !is_present(cell) {
                continue;
            }
            count += 1;
            // Canonical JSON keeps string/number/bool values distinct.
            if let Some(cell) = cell {
                distinct.insert(cell.to_string());
            }
            if let Some(n) = parse_numeric(cell) {
                numeric.push(n);
            }
        }

        let stats = if numeric.is_empty() {
            ColumnSummary {
                count,
                unique: distinct.len(),
                null_count: total - count,
                min: None,
                max: None,
                avg: None,
                sum: None,
            }
        } else {
            let sum: f64 = numeric.iter().sum();
            ColumnSummary {
                count,
                unique: distinct.len(),
                null_count: total - count,
                min: Some(numeric.iter().copied().fold(f64::INFINITY, f64::min)),
                max: Some(numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                avg: Some(sum / numeric.len() as f64),
                sum: Some(sum),
            }
        };

        summary.insert(column, stats);
    }

    summary
}

/// Bucket rows by the raw value of `group_column` and aggregate the coerced
/// numbers of `aggregate_column` (coercion failure counts as 0).
///
/// Rows whose group cell is null or absent bucket under the empty-string
/// key, the same convention composite keys use everywhere else.
pub fn group_by(
    table: &Table,
    group_column: &str,
    aggregate_column: &str,
    operation: Aggregation,
) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for row in table.rows() {
        let key = cell_text(row.get(group_column)).unwrap_or_default();
        let value = parse_numeric(row.get(aggregate_column)).unwrap_or(0.0);
        groups.entry(key).or_default().push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| (key, operation.reduce(&values)))
        .collect()
}

/// Build a pivot table.
///
/// Row and column keys are the configured fields joined with `"|"`; the
/// column key is the empty string when `columns` is empty. Every value
/// field's coerced number lands in the same `(rowKey, colKey)` bucket, so
/// multiple value fields interleave into one aggregate per cell rather than
/// one per field. Kept for compatibility with existing pivot configs;
/// callers wanting per-field aggregates should pivot once per value field.
pub fn pivot(table: &Table, config: &PivotConfig) -> PivotTable {
    let mut buckets: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();

    for row in table.rows() {
        let row_key = join_key(row, &config.rows);
        let col_key = join_key(row, &config.columns);

        let bucket = buckets.entry(row_key).or_default().entry(col_key).or_default();
        for field in &config.values {
            bucket.push(parse_numeric(row.get(field)).unwrap_or(0.0));
        }
    }

    buckets
        .into_iter()
        .map(|(row_key, cols)| {
            let reduced = cols
                .into_iter()
                .map(|(col_key, values)| (col_key, config.aggregation.reduce(&values)))
                .collect();
            (row_key, reduced)
        })
        .collect()
}

fn join_key(row: &crate::table::Row, fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| cell_text(row.get(f)).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_summary_non_numeric_column() {
        // Empty strings are missing: count 2, unique 2, no numeric block.
        let table = Table::from_rows(vec![
            row(&[("v", json!("a"))]),
            row(&[("v", json!("b"))]),
            row(&[("v", json!(""))]),
        ]);

        let summary = summarize(&table);
        let v = &summary["v"];
        assert_eq!(v.count, 2);
        assert_eq!(v.unique, 2);
        assert_eq!(v.null_count, 1);
        assert!(v.min.is_none());
        assert!(v.max.is_none());
        assert!(v.avg.is_none());
        assert!(v.sum.is_none());
    }

    #[test]
    fn test_summary_numeric_column() {
        let table = Table::from_rows(vec![
            row(&[("n", json!("1"))]),
            row(&[("n", json!("3"))]),
            row(&[("n", json!("abc"))]),
            row(&[("n", json!(""))]),
        ]);

        let summary = summarize(&table);
        let n = &summary["n"];
        // "abc" is present but excluded from the numeric stats.
        assert_eq!(n.count, 3);
        assert_eq!(n.unique, 3);
        assert_eq!(n.null_count, 1);
        assert_eq!(n.min, Some(1.0));
        assert_eq!(n.max, Some(3.0));
        assert_eq!(n.sum, Some(4.0));
        assert_eq!(n.avg, Some(2.0));
    }

    #[test]
    fn test_summary_whitespace_cell_counts_as_zero() {
        // " " is present and numerically 0, so it joins the numeric stats.
        let table = Table::from_rows(vec![
            row(&[("n", json!(" "))]),
            row(&[("n", json!("4"))]),
        ]);

        let summary = summarize(&table);
        let n = &summary["n"];
        assert_eq!(n.count, 2);
        assert_eq!(n.null_count, 0);
        assert_eq!(n.min, Some(0.0));
        assert_eq!(n.max, Some(4.0));
        assert_eq!(n.sum, Some(4.0));
        assert_eq!(n.avg, Some(2.0));
    }

    #[test]
    fn test_summary_count_plus_null_count_is_total() {
        let table = Table::from_rows(vec![
            row(&[("a", json!("x")), ("b", json!(""))]),
            row(&[("a", Value::Null), ("b", json!("y"))]),
            row(&[("a", json!("z"))]),
        ]);

        let summary = summarize(&table);
        for stats in summary.values() {
            assert_eq!(stats.count + stats.null_count, table.len());
        }
    }

    #[test]
    fn test_summary_unique_is_type_sensitive() {
        let table = Table::from_rows(vec![
            row(&[("n", json!(5))]),
            row(&[("n", json!("5"))]),
        ]);

        let summary = summarize(&table);
        assert_eq!(summary["n"].unique, 2);
    }

    #[test]
    fn test_group_by_sum() {
        let table = Table::from_rows(vec![
            row(&[("cat", json!("x")), ("n", json!("1"))]),
            row(&[("cat", json!("x")), ("n", json!("3"))]),
            row(&[("cat", json!("y")), ("n", json!("5"))]),
        ]);

        let result = group_by(&table, "cat", "n", Aggregation::Sum);
        assert_eq!(result["x"], 4.0);
        assert_eq!(result["y"], 5.0);
    }

    #[test]
    fn test_group_by_failed_coercion_counts_as_zero() {
        let table = Table::from_rows(vec![
            row(&[("cat", json!("x")), ("n", json!("oops"))]),
            row(&[("cat", json!("x")), ("n", json!("2"))]),
        ]);

        assert_eq!(group_by(&table, "cat", "n", Aggregation::Sum)["x"], 2.0);
        // The failed cell still occupies a slot for avg/count.
        assert_eq!(group_by(&table, "cat", "n", Aggregation::Avg)["x"], 1.0);
        assert_eq!(group_by(&table, "cat", "n", Aggregation::Count)["x"], 2.0);
        assert_eq!(group_by(&table, "cat", "n", Aggregation::Min)["x"], 0.0);
    }

    #[test]
    fn test_group_by_null_cells_bucket_under_empty_key() {
        let table = Table::from_rows(vec![
            row(&[("cat", Value::Null), ("n", json!("1"))]),
            row(&[("n", json!("2"))]),
            row(&[("cat", json!("x")), ("n", json!("4"))]),
        ]);

        let result = group_by(&table, "cat", "n", Aggregation::Sum);
        assert_eq!(result[""], 3.0);
        assert_eq!(result["x"], 4.0);
    }

    #[test]
    fn test_group_by_min_max() {
        let table = Table::from_rows(vec![
            row(&[("cat", json!("x")), ("n", json!(7))]),
            row(&[("cat", json!("x")), ("n", json!(2))]),
        ]);

        assert_eq!(group_by(&table, "cat", "n", Aggregation::Min)["x"], 2.0);
        assert_eq!(group_by(&table, "cat", "n", Aggregation::Max)["x"], 7.0);
    }

    fn sales_table() -> Table {
        Table::from_rows(vec![
            row(&[("region", json!("north")), ("quarter", json!("q1")), ("amount", json!("10"))]),
            row(&[("region", json!("north")), ("quarter", json!("q2")), ("amount", json!("20"))]),
            row(&[("region", json!("south")), ("quarter", json!("q1")), ("amount", json!("5"))]),
            row(&[("region", json!("north")), ("quarter", json!("q1")), ("amount", json!("1"))]),
        ])
    }

    #[test]
    fn test_pivot_sum() {
        let config = PivotConfig {
            rows: vec!["region".into()],
            columns: vec!["quarter".into()],
            values: vec!["amount".into()],
            aggregation: Aggregation::Sum,
        };

        let result = pivot(&sales_table(), &config);
        assert_eq!(result["north"]["q1"], 11.0);
        assert_eq!(result["north"]["q2"], 20.0);
        assert_eq!(result["south"]["q1"], 5.0);
        assert!(result["south"].get("q2").is_none());
    }

    #[test]
    fn test_pivot_empty_col_fields_matches_group_by() {
        let table = sales_table();
        let config = PivotConfig {
            rows: vec!["region".into()],
            columns: vec![],
            values: vec!["amount".into()],
            aggregation: Aggregation::Sum,
        };

        let pivoted = pivot(&table, &config);
        let grouped = group_by(&table, "region", "amount", Aggregation::Sum);

        for (key, total) in &grouped {
            assert_eq!(pivoted[key][""], *total);
        }
    }

    #[test]
    fn test_pivot_composite_row_key() {
        let config = PivotConfig {
            rows: vec!["region".into(), "quarter".into()],
            columns: vec![],
            values: vec!["amount".into()],
            aggregation: Aggregation::Count,
        };

        let result = pivot(&sales_table(), &config);
        assert_eq!(result["north|q1"][""], 2.0);
        assert_eq!(result["south|q1"][""], 1.0);
    }

    #[test]
    fn test_pivot_multiple_value_fields_interleave() {
        // Both value fields land in the same bucket: one aggregate per
        // cell, not one per field.
        let table = Table::from_rows(vec![row(&[
            ("k", json!("a")),
            ("x", json!("1")),
            ("y", json!("10")),
        ])]);

        let config = PivotConfig {
            rows: vec!["k".into()],
            columns: vec![],
            values: vec!["x".into(), "y".into()],
            aggregation: Aggregation::Sum,
        };

        let result = pivot(&table, &config);
        assert_eq!(result["a"][""], 11.0);
    }

    #[test]
    fn test_aggregation_reduce() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(Aggregation::Sum.reduce(&values), 6.0);
        assert_eq!(Aggregation::Avg.reduce(&values), 2.0);
        assert_eq!(Aggregation::Count.reduce(&values), 3.0);
        assert_eq!(Aggregation::Min.reduce(&values), 1.0);
        assert_eq!(Aggregation::Max.reduce(&values), 3.0);
        assert_eq!(Aggregation::Sum.reduce(&[]), 0.0);
        assert_eq!(Aggregation::Avg.reduce(&[]), 0.0);
    }

    #[test]
    fn test_invalid_aggregation_rejected_at_parse() {
        let result: Result<Aggregation, _> = serde_json::from_str("\"median\"");
        assert!(result.is_err());
    }
}
