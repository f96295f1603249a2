//! Rename target naming: `[CD<d>-]<tt> - <title><ext>`

use std::fs;
use std::path::{Path, PathBuf};
use tagsync_core::MetadataRecord;
use tagsync_metadata::filename;

/// Sanitize a string for use in filenames
///
/// Replaces characters that are invalid on common filesystems
pub fn sanitize_filename_part(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            // Invalid on Windows: < > : " / \ | ? *
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        // Windows drops trailing dots
        .trim_end_matches('.')
        .trim_end()
        .to_string()
}

/// Title used for renaming: the record's title, else the one in its filename
fn rename_title(record: &MetadataRecord) -> Option<String> {
    record
        .tags
        .title
        .clone()
        .or_else(|| filename::parse_path(record.path()).title)
}

/// Compute the file name a record would be renamed to
///
/// Returns `None` when the record has no track number or no usable title.
pub fn target_file_name(record: &MetadataRecord) -> Option<String> {
    let track = record.tags.track_number?;
    let title = sanitize_filename_part(&rename_title(record)?);
    if title.is_empty() {
        return None;
    }

    let stem = filename::render_stem(record.tags.disc_number, track, &title);
    let name = match record.path().extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };
    Some(name)
}

/// Compute the full rename target (same directory as the source)
pub fn target_path(record: &MetadataRecord) -> Option<PathBuf> {
    let name = target_file_name(record)?;
    Some(match record.path().parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    })
}

/// Whether `target` names the same file as `source`
///
/// A case-only rename on a case-insensitive filesystem sees its own source as
/// an existing target.
pub fn is_same_file(source: &Path, target: &Path) -> bool {
    source == target || same_identity(source, target)
}

#[cfg(unix)]
fn same_identity(source: &Path, target: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(source), fs::metadata(target)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_identity(source: &Path, target: &Path) -> bool {
    source.to_string_lossy().to_lowercase() == target.to_string_lossy().to_lowercase()
}
