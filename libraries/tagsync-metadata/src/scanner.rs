/// Batch scanner implementation
use crate::error::{MetadataError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Audio extensions recognized by the scanner and the tag codec
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "m4a", "ogg", "wma"];

/// An entry the scanner had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    /// Offending path, when walkdir could name it
    pub path: Option<PathBuf>,

    /// Human-readable reason
    pub reason: String,
}

/// Result of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Candidate files, sorted lexicographically by path
    pub files: Vec<PathBuf>,

    /// Entries that could not be read (traversal continued past them)
    pub issues: Vec<ScanIssue>,
}

/// Directory scanner producing candidate audio files
#[derive(Debug, Clone)]
pub struct BatchScanner {
    extensions: Vec<String>,
    follow_links: bool,
}

impl Default for BatchScanner {
    fn default() -> Self {
        Self {
            extensions: AUDIO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            follow_links: false,
        }
    }
}

impl BatchScanner {
    /// Create a scanner for the default audio extensions
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom extension set (compared case-insensitively)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Follow symbolic links while walking
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Scan `root` for candidate files
    ///
    /// # Errors
    /// Fails only when the root itself is missing, not a directory, or
    /// unreadable. Unreadable entries below the root are reported as issues.
    pub fn scan(&self, root: &Path, recursive: bool) -> Result<ScanOutcome> {
        if !root.exists() {
            return Err(MetadataError::FileNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(MetadataError::NotADirectory(root.display().to_string()));
        }
        fs::read_dir(root).map_err(|e| MetadataError::RootUnreadable {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut outcome = ScanOutcome::default();
        let max_depth = if recursive { usize::MAX } else { 1 };

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.follow_links)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    outcome.issues.push(ScanIssue {
                        path: e.path().map(Path::to_path_buf),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_supported_file(entry.path()) {
                outcome.files.push(entry.into_path());
            }
        }

        outcome.files.sort();
        debug!(
            "Scanned {:?}: {} file(s), {} issue(s)",
            root,
            outcome.files.len(),
            outcome.issues.len()
        );

        Ok(outcome)
    }

    /// Check if file has a recognized extension
    pub fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_lowercase()))
    }
}
