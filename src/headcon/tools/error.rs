use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that abort an extraction or aggregation
/// call. Row-level problems inside a sheet never surface here; they are
/// skipped by the extractors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when a requested sheet is not part of the workbook.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a cell reference such as `H5` cannot be decoded.
    #[error("invalid cell reference '{0}'")]
    InvalidCellReference(String),

    /// Raised when the month/year pair does not describe a calendar month.
    #[error("invalid reporting period {month:02}/{year}")]
    InvalidPeriod { month: u32, year: i32 },

    /// Raised when a date layout cannot be translated into a parser format.
    #[error("invalid date layout '{layout}': {reason}")]
    InvalidDateLayout { layout: String, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
