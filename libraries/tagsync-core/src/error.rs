/// Core error types for Tagsync
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Tagsync
#[derive(Error, Debug)]
pub enum CoreError {
    /// A record with this path is already in the store
    #[error("Duplicate record path: {}", .0.display())]
    DuplicatePath(PathBuf),

    /// No record with this path in the store
    #[error("Record not found: {}", .0.display())]
    RecordNotFound(PathBuf),

    /// A value could not be assigned to a field
    #[error("Invalid value {value:?} for field {field}")]
    InvalidValue { field: String, value: String },

    /// Container format has no tag codec
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Permission denied while touching a file
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Tags could not be read
    #[error("Tag read failed: {0}")]
    TagRead(String),

    /// Tags could not be written
    #[error("Tag write failed: {0}")]
    TagWrite(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a tag read error
    pub fn tag_read(msg: impl Into<String>) -> Self {
        Self::TagRead(msg.into())
    }

    /// Create a tag write error
    pub fn tag_write(msg: impl Into<String>) -> Self {
        Self::TagWrite(msg.into())
    }
}
