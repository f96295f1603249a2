//! In-memory record store
//!
//! The store is the working set between scan/import and update/export. It
//! keeps records in discovery order and never holds two records for the same
//! path.

use crate::error::{CoreError, Result};
use crate::types::{Field, MetadataRecord, Source, TagFields};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Ordered collection of metadata records keyed by path
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<MetadataRecord>,
    index: HashMap<PathBuf, usize>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in order
    pub fn from_records(records: impl IntoIterator<Item = MetadataRecord>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Append a record
    ///
    /// # Errors
    /// Returns `DuplicatePath` if a record for the same path already exists
    pub fn insert(&mut self, record: MetadataRecord) -> Result<()> {
        if self.index.contains_key(record.path()) {
            return Err(CoreError::DuplicatePath(record.path().to_path_buf()));
        }
        self.index
            .insert(record.path().to_path_buf(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if a record exists for `path`
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Get a record by path
    pub fn get(&self, path: &Path) -> Option<&MetadataRecord> {
        self.index.get(path).map(|i| &self.records[*i])
    }

    /// Get a mutable record by path
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut MetadataRecord> {
        self.index.get(path).map(|i| &mut self.records[*i])
    }

    /// Iterate over records in store order
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    /// Paths in store order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.path().to_path_buf()).collect()
    }

    /// Consume the store, returning records in order
    pub fn into_records(self) -> Vec<MetadataRecord> {
        self.records
    }

    /// Move a record to a new path, keeping its position
    ///
    /// # Errors
    /// Returns `RecordNotFound` if `from` is unknown and `DuplicatePath` if
    /// another record already uses `to`
    pub fn relocate(&mut self, from: &Path, to: &Path) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if self.index.contains_key(to) {
            return Err(CoreError::DuplicatePath(to.to_path_buf()));
        }
        let position = self
            .index
            .remove(from)
            .ok_or_else(|| CoreError::RecordNotFound(from.to_path_buf()))?;
        self.records[position].set_path(to.to_path_buf());
        self.index.insert(to.to_path_buf(), position);
        Ok(())
    }

    /// Record that `fields` of the record at `path` now hold values from `source`
    pub fn mark_source(&mut self, path: &Path, fields: &[Field], source: Source) -> Result<()> {
        let record = self
            .get_mut(path)
            .ok_or_else(|| CoreError::RecordNotFound(path.to_path_buf()))?;
        record.provenance.mark(fields, source);
        Ok(())
    }

    /// Apply a bulk edit
    ///
    /// The value is validated once before any record changes, so an invalid
    /// value leaves the store untouched. Returns the number of records edited.
    pub fn apply_edit(&mut self, edit: &BulkEdit) -> Result<usize> {
        let mut probe = TagFields::new();
        probe.set_text(edit.field, edit.value.as_deref())?;

        let mut edited = 0;
        for record in &mut self.records {
            if let Some(targets) = &edit.targets {
                if !targets.iter().any(|t| t == record.path()) {
                    continue;
                }
            }
            record.set_field(edit.field, edit.value.as_deref(), Source::Manual)?;
            edited += 1;
        }

        Ok(edited)
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a MetadataRecord;
    type IntoIter = std::slice::Iter<'a, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Set (or clear) one field across many records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEdit {
    /// Field to edit
    pub field: Field,

    /// New value (`None` clears the field)
    pub value: Option<String>,

    /// Records to edit (`None` edits every record)
    pub targets: Option<Vec<PathBuf>>,
}

impl BulkEdit {
    /// Set `field` to `value` on every record
    pub fn set(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: Some(value.into()),
            targets: None,
        }
    }

    /// Clear `field` on every record
    pub fn clear(field: Field) -> Self {
        Self {
            field,
            value: None,
            targets: None,
        }
    }

    /// Restrict the edit to the given paths
    pub fn only(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.targets = Some(paths.into_iter().collect());
        self
    }
}
