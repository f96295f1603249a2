//! Error types for the update engine

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Name collision: {} {reason}", .target.display())]
    NameCollision { target: PathBuf, reason: String },

    #[error("Tag write failed: {0}")]
    TagWrite(#[source] tagsync_core::CoreError),

    #[error("Rename to {} failed: {source}", .target.display())]
    Rename {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub(crate) fn collision(target: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::NameCollision {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a rename collision
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::NameCollision { .. })
    }
}
