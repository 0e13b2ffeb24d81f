//! Pipeline executor: applies an ordered operation list to a table.
//!
//! Operators run strictly in list order, each consuming the previous
//! operator's full output. The executor fails fast: the first operator
//! error aborts the run and the caller gets that error, never a partially
//! transformed table.
//!
//! # Example
//!
//! ```rust,ignore
//! use tablemill::{apply_operations, Operation};
//!
//! let cleaned = apply_operations(&table, &ops)?;
//! ```

use serde::Serialize;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_success};
use crate::parser::{parse_bytes_auto, parse_file_auto, ParseResult};
use crate::table::Table;
use crate::transform::ops::Operation;

/// Apply an ordered list of operations to a table.
///
/// This is the core engine contract: a pure function of the input table and
/// the operation list. Each operator sees the previous operator's output.
pub fn apply_operations(table: &Table, operations: &[Operation]) -> PipelineResult<Table> {
    let mut current = table.clone();
    for op in operations {
        current = op.apply(&current)?;
    }
    Ok(current)
}

/// Result of a file-level processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    /// The transformed table.
    pub table: Table,
    /// Row count before any operation ran.
    pub input_rows: usize,
    /// CSV parsing metadata.
    pub csv_info: CsvInfo,
}

/// CSV file information.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.table.len(),
        }
    }
}

/// Parse a CSV file and run the operation list over it.
///
/// 1. Parses the CSV with encoding/delimiter auto-detection
/// 2. Applies the operations in order (fail-fast)
/// 3. Returns the transformed table plus parsing metadata
pub fn process_file(path: &Path, operations: &[Operation]) -> PipelineResult<ProcessResult> {
    let parsed = parse_file_auto(path)?;
    process_parsed(parsed, operations)
}

/// Same as [`process_file`] but for raw bytes.
pub fn process_bytes(bytes: &[u8], operations: &[Operation]) -> PipelineResult<ProcessResult> {
    let parsed = parse_bytes_auto(bytes)?;
    process_parsed(parsed, operations)
}

fn process_parsed(parsed: ParseResult, operations: &[Operation]) -> PipelineResult<ProcessResult> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected delimiter: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows, {} columns", parsed.table.len(), parsed.headers.len()));

    if parsed.table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let csv_info = CsvInfo::from(&parsed);
    let input_rows = parsed.table.len();

    log_info(format!("Applying {} operation(s)...", operations.len()));
    let mut current = parsed.table;
    for op in operations {
        current = op.apply(&current)?;
        log_info(format!("{} -> {} rows", op.name(), current.len()));
    }
    log_success(format!("Done: {} rows out", current.len()));

    Ok(ProcessResult { table: current, input_rows, csv_info })
}

/// Format delimiter for display.
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
