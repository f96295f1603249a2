/// Record store to CSV
use crate::error::{CsvError, Result};
use crate::COLUMNS;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tagsync_core::{Field, MetadataRecord, RecordStore};
use tracing::debug;

/// Write one header row and one row per record, in store order
///
/// Absent values render as empty cells.
pub fn export<W: Write>(store: &RecordStore, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    for record in store {
        csv_writer.write_record(row(record))?;
    }
    csv_writer.flush()?;

    debug!("Exported {} record(s)", store.len());
    Ok(())
}

/// Export to an in-memory string
pub fn export_to_string(store: &RecordStore) -> Result<String> {
    let mut buffer = Vec::new();
    export(store, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| CsvError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Export to a file, replacing it
pub fn export_file(store: &RecordStore, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    export(store, io::BufWriter::new(file))
}

fn row(record: &MetadataRecord) -> Vec<String> {
    let filename = record
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    std::iter::once(filename)
        .chain(
            Field::ALL
                .iter()
                .map(|field| record.tags.text(*field).unwrap_or_default()),
        )
        .collect()
}
