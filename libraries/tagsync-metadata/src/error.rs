/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Tag parsing error
    #[error("Tag parsing error: {0}")]
    ParseError(String),

    /// Tag writing error
    #[error("Tag writing error: {0}")]
    WriteError(String),

    /// Scan root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Scan root could not be listed
    #[error("Cannot read directory {path}: {reason}")]
    RootUnreadable { path: String, reason: String },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl From<MetadataError> for tagsync_core::CoreError {
    fn from(err: MetadataError) -> Self {
        use tagsync_core::CoreError;
        match err {
            MetadataError::FileNotFound(path) => CoreError::FileNotFound(path),
            MetadataError::UnsupportedFormat(msg) => CoreError::UnsupportedFormat(msg),
            MetadataError::PermissionDenied(msg) => CoreError::PermissionDenied(msg),
            MetadataError::ParseError(msg) => CoreError::tag_read(msg),
            MetadataError::WriteError(msg) => CoreError::tag_write(msg),
            MetadataError::Io(err) => CoreError::Io(err),
            other => CoreError::tag_read(other.to_string()),
        }
    }
}
