/// Converter errors
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ConvertError`
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("FFmpeg not found at {0}")]
    FfmpegNotFound(String),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("No video files found in {}", .0.display())]
    NoInputs(PathBuf),

    #[error("FFprobe failed: {0}")]
    Probe(String),

    /// Non-zero exit; `code` is `None` when killed by a signal
    #[error("FFmpeg exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Scan error: {0}")]
    Scan(#[from] tagsync_metadata::MetadataError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
