//! Table export to CSV and XLSX.
//!
//! Column order comes from the table (first row's keys, then first-seen),
//! and cell text round-trips losslessly: absent cells become empty fields
//! in CSV and blank cells in XLSX.

use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ExportError, ExportResult};
use crate::table::Table;

/// Target export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "xls" => Ok(ExportFormat::Xlsx),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

/// Write a table to `path` in the given format.
pub fn write_table(table: &Table, format: ExportFormat, path: &Path) -> ExportResult<()> {
    match format {
        ExportFormat::Csv => write_csv(table, path),
        ExportFormat::Xlsx => write_xlsx(table, path),
    }
}

/// Serialize a table to CSV text.
pub fn to_csv_string(table: &Table) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_csv_records(table, &mut writer)?;
    let buffer = writer.into_inner().map_err(|e| ExportError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write a table to a CSV file.
pub fn write_csv(table: &Table, path: &Path) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    write_csv_records(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_csv_records<W: std::io::Write>(
    table: &Table,
    writer: &mut csv::Writer<W>,
) -> ExportResult<()> {
    let columns = table.columns();
    writer.write_record(&columns)?;

    for row in table.rows() {
        let record: Vec<String> = columns
            .iter()
            .map(|col| export_text(row.get(col)))
            .collect();
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Write a table to an XLSX workbook with a single "Data" sheet.
///
/// Numbers and booleans keep their type in the sheet; everything else is
/// written as text.
pub fn write_xlsx(table: &Table, path: &Path) -> ExportResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name("Data")?;

    let columns = table.columns();
    for (col_idx, column) in columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, column)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, column) in columns.iter().enumerate() {
            let sheet_col = col_idx as u16;
            match row.get(column) {
                Some(Value::Number(n)) => {
                    if let Some(v) = n.as_f64() {
                        worksheet.write_number(sheet_row, sheet_col, v)?;
                    }
                }
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(sheet_row, sheet_col, *b)?;
                }
                Some(Value::String(s)) => {
                    worksheet.write_string(sheet_row, sheet_col, s)?;
                }
                // Absent and null cells stay blank.
                _ => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn export_text(cell: Option<&Value>) -> String {
    match cell {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;
    use crate::table::Row;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("xls".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_to_csv_string_preserves_order() {
        let table = Table::from_rows(vec![
            row(&[("z", json!("1")), ("a", json!("2"))]),
            row(&[("z", json!("3")), ("a", json!("4"))]),
        ]);

        let csv = to_csv_string(&table).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("z,a"));
        assert_eq!(lines.next(), Some("1,2"));
        assert_eq!(lines.next(), Some("3,4"));
    }

    #[test]
    fn test_absent_cells_export_as_empty_fields() {
        let table = Table::from_rows(vec![
            row(&[("a", json!("1")), ("b", json!("2"))]),
            row(&[("a", json!("3"))]),
        ]);

        let csv = to_csv_string(&table).unwrap();
        assert!(csv.lines().any(|l| l == "3,"));
    }

    #[test]
    fn test_mixed_types_export_as_text() {
        let table = Table::from_rows(vec![row(&[
            ("s", json!("x")),
            ("n", json!(30)),
            ("b", json!(true)),
            ("nil", Value::Null),
        ])]);

        let csv = to_csv_string(&table).unwrap();
        assert!(csv.contains("x,30,true,"));
    }

    #[test]
    fn test_csv_round_trip() {
        let source = "name,age\nAlice,30\nBob,25";
        let parsed = parse_string(source, ',', "utf-8".into()).unwrap();

        let exported = to_csv_string(&parsed.table).unwrap();
        let reparsed = parse_string(&exported, ',', "utf-8".into()).unwrap();

        assert_eq!(parsed.table, reparsed.table);
        assert_eq!(parsed.headers, reparsed.headers);
    }

    #[test]
    fn test_write_csv_and_xlsx_files() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::from_rows(vec![row(&[("a", json!("1")), ("n", json!(2))])]);

        let csv_path = dir.path().join("out.csv");
        write_table(&table, ExportFormat::Csv, &csv_path).unwrap();
        assert!(csv_path.exists());

        let xlsx_path = dir.path().join("out.xlsx");
        write_table(&table, ExportFormat::Xlsx, &xlsx_path).unwrap();
        assert!(xlsx_path.metadata().unwrap().len() > 0);
    }
}
