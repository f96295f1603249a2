/// Metadata record domain type
use super::field::{Field, TagFields};
use super::source::{Provenance, Source};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metadata held for one audio file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// File path on disk (identity key within a store)
    path: PathBuf,

    /// Current tag values
    pub tags: TagFields,

    /// Where each field group's values came from
    pub provenance: Provenance,
}

impl MetadataRecord {
    /// Create a record with no values
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tags: TagFields::new(),
            provenance: Provenance::default(),
        }
    }

    /// Create a record whose values all came from one source
    pub fn with_tags(path: impl Into<PathBuf>, tags: TagFields, source: Source) -> Self {
        Self {
            path: path.into(),
            tags,
            provenance: Provenance::uniform(source),
        }
    }

    /// File path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename of the file
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Set one field from text and record its provenance
    pub fn set_field(&mut self, field: Field, value: Option<&str>, source: Source) -> crate::Result<()> {
        self.tags.set_text(field, value)?;
        self.provenance.set(field.group(), source);
        Ok(())
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }
}
