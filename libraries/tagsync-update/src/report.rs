//! Plan and outcome types

use crate::error::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tagsync_core::{Field, RecordStore, Source, TagFields};

/// Update options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// Rename files to `[CD<d>-]<tt> - <title><ext>`
    pub rename: bool,

    /// Replace an existing rename destination instead of failing
    pub overwrite: bool,

    /// Compute and report without touching the filesystem
    pub dry_run: bool,
}

/// Why a planned rename cannot proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// Destination already exists on disk
    Exists(PathBuf),

    /// Destination is shared with other records in the same plan
    Shared { target: PathBuf, with: usize },

    /// Destination is the current path of another record in the store
    Occupied(PathBuf),
}

impl Collision {
    pub(crate) fn to_error(&self) -> UpdateError {
        match self {
            Collision::Exists(target) => UpdateError::collision(target, "already exists"),
            Collision::Shared { target, with } => UpdateError::collision(
                target,
                format!("is also the target of {} other record(s)", with),
            ),
            Collision::Occupied(target) => {
                UpdateError::collision(target, "belongs to another record being updated")
            }
        }
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error())
    }
}

/// One file's planned changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Current path
    pub path: PathBuf,

    /// Rename destination (present only when `will_rename`)
    pub new_path: Option<PathBuf>,

    /// Fields to write (the record's present fields)
    pub write_set: TagFields,

    /// Whether a rename is part of the plan
    pub will_rename: bool,

    /// Rename collision found while planning; the file is skipped entirely
    pub collision: Option<Collision>,
}

/// Changes computed for a whole store before any disk mutation
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    pub files: Vec<PlannedFile>,
    pub options: UpdateOptions,
}

impl UpdatePlan {
    /// Number of planned files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the plan is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files whose rename collides
    pub fn collisions(&self) -> impl Iterator<Item = &PlannedFile> {
        self.files.iter().filter(|f| f.collision.is_some())
    }
}

/// Result of applying the plan to one file
#[derive(Debug)]
pub struct FileOutcome {
    /// Path before the update
    pub path: PathBuf,

    /// Fields written (or that would have been in a dry run)
    pub written: Vec<Field>,

    /// Destination the file was (or would have been) renamed to
    pub renamed_to: Option<PathBuf>,

    /// Failure, if any. A tag write recorded in `written` stands even when a
    /// later rename failed.
    pub error: Option<UpdateError>,

    /// Whether this outcome comes from a dry run
    pub simulated: bool,
}

impl FileOutcome {
    /// Check if the file was fully updated
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Check if nothing was (or would have been) changed
    pub fn is_unchanged(&self) -> bool {
        self.is_success() && self.written.is_empty() && self.renamed_to.is_none()
    }

    /// One-line reason for a failure
    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Path the file lives at after the update
    pub fn final_path(&self) -> &Path {
        self.renamed_to.as_deref().unwrap_or(&self.path)
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.simulated { "[dry run] " } else { "" };
        match &self.error {
            Some(error) => write!(f, "{}FAILED {}: {}", label, self.path.display(), error),
            None => match &self.renamed_to {
                Some(target) => write!(
                    f,
                    "{}OK {} -> {}",
                    label,
                    self.path.display(),
                    target.display()
                ),
                None => write!(f, "{}OK {}", label, self.path.display()),
            },
        }
    }
}

/// Outcome of a whole update batch, one entry per planned file
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub outcomes: Vec<FileOutcome>,
    pub dry_run: bool,
}

impl UpdateReport {
    /// Files updated without error
    pub fn successes(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Files that failed
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Files whose tags were written
    pub fn tags_written(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.written.is_empty()).count()
    }

    pub fn renamed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_success() && o.renamed_to.is_some())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_unchanged()).count()
    }

    pub fn summary_text(&self) -> String {
        format!(
            "{}Update complete: {} files, {} tags written, {} renamed, {} failed, {} unchanged",
            if self.dry_run { "[dry run] " } else { "" },
            self.total(),
            self.tags_written(),
            self.renamed(),
            self.failed(),
            self.unchanged()
        )
    }

    /// Bring a store in line with what happened on disk
    ///
    /// Written field groups become `TAG` and renamed records are re-keyed.
    /// A dry-run report changes nothing.
    pub fn refresh_store(&self, store: &mut RecordStore) -> tagsync_core::Result<()> {
        if self.dry_run {
            return Ok(());
        }

        for outcome in &self.outcomes {
            if !outcome.written.is_empty() {
                store.mark_source(&outcome.path, &outcome.written, Source::Tag)?;
            }
            if outcome.is_success() {
                if let Some(target) = &outcome.renamed_to {
                    store.relocate(&outcome.path, target)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsync_core::MetadataRecord;

    fn outcome(path: &str, written: Vec<Field>, renamed: Option<&str>, failed: bool) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from(path),
            written,
            renamed_to: renamed.map(PathBuf::from),
            error: failed.then(|| UpdateError::collision(path, "already exists")),
            simulated: false,
        }
    }

    #[test]
    fn counts_and_summary() {
        let report = UpdateReport {
            outcomes: vec![
                outcome("/m/a.mp3", vec![Field::Title], Some("/m/01 - A.mp3"), false),
                outcome("/m/b.mp3", vec![], None, false),
                outcome("/m/c.mp3", vec![], None, true),
            ],
            dry_run: false,
        };

        assert_eq!(report.total(), 3);
        assert_eq!(report.tags_written(), 1);
        assert_eq!(report.renamed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(
            report.summary_text(),
            "Update complete: 3 files, 1 tags written, 1 renamed, 1 failed, 1 unchanged"
        );
    }

    #[test]
    fn refresh_rekeys_and_marks_tag() {
        let mut store = RecordStore::new();
        let mut record = MetadataRecord::new("/m/a.mp3");
        record.provenance = tagsync_core::Provenance::uniform(Source::Manual);
        store.insert(record).unwrap();
        store.insert(MetadataRecord::new("/m/b.mp3")).unwrap();

        let report = UpdateReport {
            outcomes: vec![outcome(
                "/m/a.mp3",
                vec![Field::Title, Field::TrackNumber],
                Some("/m/01 - A.mp3"),
                false,
            )],
            dry_run: false,
        };
        report.refresh_store(&mut store).unwrap();

        let moved = store.get(Path::new("/m/01 - A.mp3")).unwrap();
        assert_eq!(moved.provenance.title, Source::Tag);
        assert_eq!(moved.provenance.numbering, Source::Tag);
        assert_eq!(moved.provenance.descriptive, Source::Manual);
        assert!(!store.contains(Path::new("/m/a.mp3")));
    }

    #[test]
    fn dry_run_refresh_is_noop() {
        let mut store = RecordStore::from_records([MetadataRecord::new("/m/a.mp3")]).unwrap();
        let report = UpdateReport {
            outcomes: vec![outcome("/m/a.mp3", vec![Field::Title], Some("/m/x.mp3"), false)],
            dry_run: true,
        };
        report.refresh_store(&mut store).unwrap();
        assert!(store.contains(Path::new("/m/a.mp3")));
    }

    #[test]
    fn display_labels_simulated() {
        let mut failed = outcome("/m/c.mp3", vec![], None, true);
        failed.simulated = true;
        assert!(failed.to_string().starts_with("[dry run] FAILED /m/c.mp3"));
    }
}
