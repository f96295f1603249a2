/// CSV to record store
use crate::error::{CsvError, Result};
use crate::{COLUMNS, FILENAME_COLUMN};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tagsync_core::{parse_position, Field, MetadataRecord, RecordStore, Source, TagFields};
use tracing::debug;

/// Imports CSV rows as records
///
/// The schema stores basenames only. Each `filename` cell is resolved against
/// the known library files (exact basename, then case-insensitive) and falls
/// back to `base_dir/filename`.
#[derive(Debug, Clone)]
pub struct CsvImporter {
    base_dir: PathBuf,
    library: Vec<PathBuf>,
}

impl CsvImporter {
    /// Create an importer resolving filenames under `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            library: Vec::new(),
        }
    }

    /// Resolve filenames against previously scanned files
    pub fn with_library(mut self, files: &[PathBuf]) -> Self {
        self.library = files.to_vec();
        self
    }

    /// Import from a reader
    ///
    /// # Errors
    /// Fails for the whole call on a missing column, malformed CSV, an empty
    /// filename, or two rows naming the same file.
    pub fn import<R: Read>(&self, reader: R) -> Result<RecordStore> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns = column_index(csv_reader.headers()?)?;
        let mut resolver = Resolver::new(&self.base_dir, &self.library);
        let mut store = RecordStore::new();

        for row in csv_reader.records() {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());

            let filename = row.get(columns.filename).unwrap_or_default();
            if filename.is_empty() {
                return Err(CsvError::EmptyFilename { line });
            }

            let mut tags = TagFields::new();
            for (field, index) in &columns.fields {
                let cell = row.get(*index).unwrap_or_default();
                set_cell(&mut tags, *field, cell);
            }

            let path = resolver.resolve(filename);
            store.insert(MetadataRecord::with_tags(path, tags, Source::Manual))?;
        }

        debug!("Imported {} record(s)", store.len());
        Ok(store)
    }

    /// Import from a file
    pub fn import_file(&self, path: &Path) -> Result<RecordStore> {
        let file = File::open(path)?;
        self.import(io::BufReader::new(file))
    }
}

struct ColumnIndex {
    filename: usize,
    fields: Vec<(Field, usize)>,
}

fn column_index(headers: &csv::StringRecord) -> Result<ColumnIndex> {
    let names: Vec<&str> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if i == 0 {
                name.trim_start_matches('\u{feff}')
            } else {
                name
            };
            name.trim()
        })
        .collect();
    let position = |column: &str| names.iter().position(|name| *name == column);

    let missing: Vec<String> = COLUMNS
        .iter()
        .filter(|column| position(column).is_none())
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvError::SchemaMismatch { missing });
    }

    let mut fields = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        if let Some(index) = position(field.column()) {
            fields.push((field, index));
        }
    }

    Ok(ColumnIndex {
        filename: position(FILENAME_COLUMN).unwrap_or_default(),
        fields,
    })
}

/// Store one cell; empty or non-numeric number cells stay absent
fn set_cell(tags: &mut TagFields, field: Field, cell: &str) {
    if cell.is_empty() {
        return;
    }
    let text = Some(cell.to_string());
    match field {
        Field::Title => tags.title = text,
        Field::Artist => tags.artist = text,
        Field::Album => tags.album = text,
        Field::AlbumArtist => tags.album_artist = text,
        Field::Genre => tags.genre = text,
        Field::Year => tags.year = text,
        Field::TrackNumber => tags.track_number = parse_position(cell),
        Field::DiscNumber => tags.disc_number = parse_position(cell),
    }
}

struct Resolver<'a> {
    base_dir: &'a Path,
    exact: HashMap<String, Vec<&'a PathBuf>>,
    folded: HashMap<String, Vec<&'a PathBuf>>,
    used: HashSet<&'a PathBuf>,
}

impl<'a> Resolver<'a> {
    fn new(base_dir: &'a Path, library: &'a [PathBuf]) -> Self {
        let mut exact: HashMap<String, Vec<&PathBuf>> = HashMap::new();
        let mut folded: HashMap<String, Vec<&PathBuf>> = HashMap::new();

        for path in library {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                exact.entry(name.to_string()).or_default().push(path);
                folded.entry(name.to_lowercase()).or_default().push(path);
            }
        }

        Self {
            base_dir,
            exact,
            folded,
            used: HashSet::new(),
        }
    }

    /// First unused exact match, then first unused case-insensitive match
    fn resolve(&mut self, filename: &str) -> PathBuf {
        let candidate = self
            .exact
            .get(filename)
            .and_then(|paths| paths.iter().find(|p| !self.used.contains(*p)))
            .or_else(|| {
                self.folded
                    .get(&filename.to_lowercase())
                    .and_then(|paths| paths.iter().find(|p| !self.used.contains(*p)))
            })
            .copied();

        match candidate {
            Some(path) => {
                self.used.insert(path);
                path.clone()
            }
            None => self.base_dir.join(filename),
        }
    }
}
