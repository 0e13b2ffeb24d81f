//! Error types for the tablemill engine.
//!
//! The hierarchy mirrors the module layout:
//!
//! - [`CsvError`] - CSV parsing errors
//! - [`OperationError`] - row-transform operator errors
//! - [`ExportError`] - CSV/XLSX serialization errors
//! - [`TemplateError`] - template registry errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations, so `?` works
//! across module boundaries.
//!
//! Numeric coercion failure is deliberately NOT an error anywhere: a cell
//! that fails to coerce falls out of greater/less filters and contributes 0
//! to group-by/pivot aggregates. The engine stays total on messy data.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Operator Errors
// =============================================================================

/// Errors raised by row-transform operators.
///
/// An operator error aborts the whole pipeline run; the caller never sees a
/// partially transformed table.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Malformed or parameter-incomplete operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A find/replace pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during table export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write output.
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    /// XLSX serialization failed.
    #[error("XLSX export error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Template Registry Errors
// =============================================================================

/// Errors from the operation template registry.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("Template IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Template JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`]
/// entry points. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Operator error.
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Template registry error.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Malformed operation list or pivot config.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No rows to process.
    #[error("Table has no rows")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV parsing.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for operator application.
pub type OperationResult<T> = Result<T, OperationError>;

/// Result type for export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for the template registry.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Result type for pipeline orchestration.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // OperationError -> PipelineError
        let op_err =
            OperationError::InvalidOperation("removeDuplicates requires at least one column".into());
        let pipeline_err: PipelineError = op_err.into();
        assert!(pipeline_err.to_string().contains("removeDuplicates"));
    }

    #[test]
    fn test_pattern_error_format() {
        let err = OperationError::InvalidPattern {
            pattern: "[unclosed".into(),
            message: "unclosed character class".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[unclosed"));
        assert!(msg.contains("unclosed character class"));
    }
}
