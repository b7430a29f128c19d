use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests, transforms, or emits a cost-breakdown workbook.
///
/// Every variant here is fatal: it aborts the conversion before any output is
/// produced. Row-level anomalies are reported as [`RowWarning`]s instead and
/// never interrupt the pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the legacy `.xls` reader implementation.
    #[error("legacy Excel read error: {0}")]
    XlsRead(#[from] calamine::XlsError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when JSON serialization of the preview output fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the input file does not carry a supported extension.
    #[error("unsupported file extension '{0}': only .xls and .xlsx workbooks are accepted")]
    InvalidExtension(String),

    /// Raised when the input workbook exceeds the size limit.
    #[error("workbook is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Raised when no worksheet matches the required sheet name.
    #[error("no worksheet with '{0}' in its name")]
    MissingWorksheet(String),

    /// Raised when the source worksheet holds too few rows to be a valid
    /// cost-breakdown table.
    #[error("worksheet has {found} rows, at least {required} required")]
    InsufficientRows { found: usize, required: usize },

    /// Raised when no cost row survives normalization.
    #[error("no valid cost rows found, check the worksheet layout")]
    NoValidRows,

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Non-fatal anomaly detected while processing a single row. The offending
/// row is dropped and the conversion continues; callers receive the
/// accumulated warnings alongside the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// The sequence label did not normalize to a valid hierarchical code.
    InvalidCode { label: String },
    /// A row produced a code that is already registered in the tree.
    DuplicateCode { code: String },
    /// The code's structural parent was never registered.
    OrphanedParent { code: String, parent: String },
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::InvalidCode { label } => {
                write!(f, "invalid sequence label '{label}', row skipped")
            }
            RowWarning::DuplicateCode { code } => {
                write!(f, "duplicate code '{code}', row skipped")
            }
            RowWarning::OrphanedParent { code, parent } => {
                write!(f, "no parent '{parent}' registered for '{code}', row skipped")
            }
        }
    }
}
