//! # Tablemill - spreadsheet cleanup, transformation and analytics
//!
//! Tablemill takes a parsed table (ordered rows of string-keyed cells), runs
//! an ordered list of declarative row operations over it, and computes
//! summary/group-by/pivot analytics on the same row model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│   Pipeline   │────▶│   Export    │
//! │ (auto-enc)  │     │ (Table out) │     │ (operations) │     │ (csv/xlsx)  │
//! └─────────────┘     └─────────────┘     └──────┬───────┘     └─────────────┘
//!                                                │
//!                                         ┌──────▼───────┐
//!                                         │  Analytics   │
//!                                         │ (summary,    │
//!                                         │  pivot, ...) │
//!                                         └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tablemill::{apply_operations, parse_bytes_auto, Operation};
//!
//! let parsed = parse_bytes_auto(&bytes)?;
//! let ops: Vec<Operation> = serde_json::from_str(ops_json)?;
//! let cleaned = apply_operations(&parsed.table, &ops)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - Row model and cell coercion rules
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Row operators and the pipeline executor
//! - [`analytics`] - Summary, group-by and pivot aggregation
//! - [`export`] - CSV/XLSX serialization
//! - [`templates`] - Stored operation lists
//! - [`logs`] - Progress reporting

// Core modules
pub mod error;
pub mod table;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Analytics
pub mod analytics;

// Export
pub mod export;

// Templates
pub mod templates;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, ExportError, OperationError, PipelineError, TemplateError,
};

// =============================================================================
// Re-exports - Table model
// =============================================================================

pub use table::{cell_text, is_present, parse_numeric, Row, Table};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    parse_string, ParseResult,
};

// =============================================================================
// Re-exports - Operations & Pipeline
// =============================================================================

pub use transform::ops::{
    operations_description, CaseType, FilterOperator, Operation, SortDirection, KEY_SEPARATOR,
};

pub use transform::pipeline::{
    apply_operations, process_bytes, process_file, CsvInfo, ProcessResult,
};

// =============================================================================
// Re-exports - Analytics
// =============================================================================

pub use analytics::{
    group_by, pivot, summarize, Aggregation, ColumnSummary, PivotConfig, PivotTable,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{to_csv_string, write_csv, write_table, write_xlsx, ExportFormat};

// =============================================================================
// Re-exports - Templates
// =============================================================================

pub use templates::{StoredTemplate, TemplateRegistry};
