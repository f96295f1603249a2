/// Core traits for Tagsync
use crate::error::Result;
use crate::types::TagFields;
use std::path::Path;

/// Tag codec trait
///
/// Implementers read and write the normalized field set against the tag
/// dialect of an audio container.
pub trait TagCodec: Send + Sync {
    /// Read whatever fields are physically present in the file
    ///
    /// Absent fields are reported as `None`, never defaulted.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn read(&self, path: &Path) -> Result<TagFields>;

    /// Overlay the present fields of `fields` onto the file's existing tags
    ///
    /// Fields that are `None` in `fields` are left untouched on disk. The
    /// write either fully applies or leaves the file unchanged. With
    /// `dry_run` set, every check runs but nothing is persisted.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    fn write(&self, path: &Path, fields: &TagFields, dry_run: bool) -> Result<()>;
}
