/// CSV transcoder errors
use thiserror::Error;

/// Result type alias using `CsvError`
pub type Result<T> = std::result::Result<T, CsvError>;

/// CSV error types
#[derive(Error, Debug)]
pub enum CsvError {
    /// Header lacks one or more expected columns
    #[error("CSV schema mismatch: missing column(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A data row has no filename
    #[error("Empty filename on line {line}")]
    EmptyFilename { line: u64 },

    /// Malformed CSV (bad quoting, ragged rows, invalid UTF-8)
    #[error("Malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    /// Record store rejected a row (duplicate path)
    #[error(transparent)]
    Store(#[from] tagsync_core::CoreError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
