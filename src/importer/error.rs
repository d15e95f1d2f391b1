// ==========================================
// Deportation Registry - Importer error types
// ==========================================
// Fatal, whole-file failures. Everything row-scoped is
// returned as structured ValidationIssue data instead.
// Tool: thiserror derive macro
// ==========================================

use crate::repository::StoreError;
use thiserror::Error;

/// Importer error type.
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File-level errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (supported: .csv/.txt/.tsv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("file too large: {size} bytes (limit {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("file read failed: {0}")]
    FileReadError(String),

    // ===== Decode errors =====
    #[error("could not detect field delimiter: best candidate matched {matches} of 12 headers ({confidence:.0}% confidence, 50% required)")]
    AmbiguousDelimiter { matches: usize, confidence: f64 },

    #[error("missing required headers: {0}")]
    MissingHeaders(String),

    #[error("row {row} has {actual} fields, header defines {expected}")]
    FieldCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("file contains no data rows")]
    NoDataRows,

    #[error("spreadsheet parse failed: {0}")]
    WorkbookParseError(String),

    #[error("delimited text parse failed: {0}")]
    CsvParseError(String),

    // ===== Store errors (validator/detector lookups) =====
    #[error(transparent)]
    Store(#[from] StoreError),

    // ===== Catch-all =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::WorkbookParseError(err.to_string())
    }
}

/// Result alias for importer operations.
pub type ImportResult<T> = Result<T, ImportError>;
