use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads, reconciles, or writes tables.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a mapping document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the input file pattern cannot be compiled.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when a workbook does not contain a usable sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a source table could not be read or parsed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: Box<ToolError>,
    },

    /// Raised when a mapping document has an unsupported shape.
    #[error("invalid column mapping: {0}")]
    InvalidMapping(String),

    /// Raised when the target schema names the same output column twice.
    #[error("target schema declares output column '{0}' more than once")]
    AmbiguousTarget(String),

    /// Raised when a table holds two columns with the same normalized name.
    #[error("duplicate column '{0}' in table")]
    DuplicateColumn(String),

    /// Raised when a table is built from columns of different lengths.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Raised in identical-columns mode when a later table diverges from the first.
    #[error("columns of {source_label} differ from the first table: missing {missing:?}, unexpected {unexpected:?}")]
    SchemaMismatch {
        source_label: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// Raised when none of the source tables could be used.
    #[error("no valid input tables could be read")]
    NoValidInput,

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    /// Wraps an error raised while loading the table stored at `path`.
    pub fn read(path: impl Into<PathBuf>, source: ToolError) -> Self {
        ToolError::Read {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
