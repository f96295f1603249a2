//! Metadata extraction
//!
//! Reads tags for each scanned file and fills gaps from the filename. The
//! per-file step is exposed as a lazy iterator so a caller can stop between
//! files.

use crate::codec::LoftyTagCodec;
use crate::filename;
use std::path::{Path, PathBuf};
use tagsync_core::{Field, MetadataRecord, RecordStore, Source, TagCodec};
use tracing::{debug, info, warn};

/// Extraction options
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Let filename-derived values replace tag values
    pub filename_override: bool,
}

/// A file whose tags could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractIssue {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of extracting one file
#[derive(Debug, Clone)]
pub struct Extracted {
    /// The record (all tag fields absent when the read failed)
    pub record: MetadataRecord,

    /// Tag read failure, if any
    pub issue: Option<ExtractIssue>,

    /// Fields that were taken from the filename
    pub filename_fields: Vec<Field>,
}

/// Extraction statistics and results
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub store: RecordStore,
    pub issues: Vec<ExtractIssue>,
    /// Records that received at least one filename-derived value
    pub filename_fallbacks: usize,
}

impl ExtractReport {
    /// Number of files processed
    pub fn scanned(&self) -> usize {
        self.store.len()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} file(s) scanned, {} tag read failure(s), {} filename fallback(s)",
            self.scanned(),
            self.issues.len(),
            self.filename_fallbacks
        )
    }
}

/// Builds records from audio files
#[derive(Debug, Clone)]
pub struct Extractor<C: TagCodec = LoftyTagCodec> {
    codec: C,
    options: ExtractOptions,
}

impl Extractor<LoftyTagCodec> {
    /// Create an extractor using the lofty codec
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_codec(LoftyTagCodec::new(), options)
    }
}

impl<C: TagCodec> Extractor<C> {
    /// Create an extractor with a specific codec
    pub fn with_codec(codec: C, options: ExtractOptions) -> Self {
        Self { codec, options }
    }

    /// Extract a single file
    pub fn extract_one(&self, path: &Path) -> Extracted {
        let (tags, issue) = match self.codec.read(path) {
            Ok(tags) => (tags, None),
            Err(e) => {
                warn!("Failed to read tags from {:?}: {}", path, e);
                let issue = ExtractIssue {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                (Default::default(), Some(issue))
            }
        };

        let mut record = MetadataRecord::with_tags(path, tags, Source::Tag);
        let needs_fallback = record.tags.title.is_none() || record.tags.track_number.is_none();

        // An unreadable file keeps every field absent so the failure stays visible
        let filename_fields = if issue.is_some() {
            Vec::new()
        } else if self.options.filename_override {
            let parsed = filename::parse_path(path).to_tags();
            record.tags.overlay(&parsed);
            parsed.present_fields()
        } else if needs_fallback {
            let parsed = filename::parse_path(path).to_tags();
            record.tags.fill_missing(&parsed)
        } else {
            Vec::new()
        };

        record.provenance.mark(&filename_fields, Source::Filename);
        if !filename_fields.is_empty() {
            debug!("Took {:?} from filename of {:?}", filename_fields, path);
        }

        Extracted {
            record,
            issue,
            filename_fields,
        }
    }

    /// Lazily extract each path in order
    pub fn records<'a, I>(&'a self, paths: I) -> impl Iterator<Item = Extracted> + 'a
    where
        I: IntoIterator<Item = &'a PathBuf>,
        I::IntoIter: 'a,
    {
        paths.into_iter().map(move |path| self.extract_one(path))
    }

    /// Extract every path into a new store
    ///
    /// # Errors
    /// Returns `DuplicatePath` if `paths` names the same file twice
    pub fn extract_all(&self, paths: &[PathBuf]) -> tagsync_core::Result<ExtractReport> {
        let mut report = ExtractReport::default();

        for extracted in self.records(paths) {
            if !extracted.filename_fields.is_empty() {
                report.filename_fallbacks += 1;
            }
            if let Some(issue) = extracted.issue {
                report.issues.push(issue);
            }
            report.store.insert(extracted.record)?;
        }

        info!("Extraction finished: {}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tagsync_core::{CoreError, TagFields};

    /// Codec answering from a fixed table
    #[derive(Default)]
    struct TableCodec {
        tags: HashMap<PathBuf, TagFields>,
    }

    impl TagCodec for TableCodec {
        fn read(&self, path: &Path) -> tagsync_core::Result<TagFields> {
            self.tags
                .get(path)
                .cloned()
                .ok_or_else(|| CoreError::tag_read(format!("{} is corrupt", path.display())))
        }

        fn write(&self, _path: &Path, _fields: &TagFields, _dry_run: bool) -> tagsync_core::Result<()> {
            Ok(())
        }
    }

    fn codec_with(entries: &[(&str, TagFields)]) -> TableCodec {
        TableCodec {
            tags: entries
                .iter()
                .map(|(p, t)| (PathBuf::from(p), t.clone()))
                .collect(),
        }
    }

    #[test]
    fn untagged_file_uses_filename() {
        let codec = codec_with(&[("/m/01 - Intro.mp3", TagFields::new())]);
        let extractor = Extractor::with_codec(codec, ExtractOptions::default());

        let extracted = extractor.extract_one(Path::new("/m/01 - Intro.mp3"));
        let record = extracted.record;

        assert_eq!(record.tags.track_number, Some(1));
        assert_eq!(record.tags.title.as_deref(), Some("Intro"));
        assert_eq!(record.tags.disc_number, None);
        assert_eq!(record.provenance.title, Source::Filename);
        assert_eq!(record.provenance.numbering, Source::Filename);
        assert_eq!(record.provenance.descriptive, Source::Tag);
        assert!(extracted.issue.is_none());
    }

    #[test]
    fn tagged_file_keeps_tags() {
        let tags = TagFields {
            title: Some("Real Title".to_string()),
            track_number: Some(9),
            ..Default::default()
        };
        let codec = codec_with(&[("/m/01 - Intro.mp3", tags.clone())]);
        let extractor = Extractor::with_codec(codec, ExtractOptions::default());

        let extracted = extractor.extract_one(Path::new("/m/01 - Intro.mp3"));
        assert_eq!(extracted.record.tags, tags);
        assert!(extracted.filename_fields.is_empty());
        assert_eq!(extracted.record.provenance.title, Source::Tag);
    }

    #[test]
    fn partial_tags_only_fill_gaps() {
        let tags = TagFields {
            title: Some("Real Title".to_string()),
            ..Default::default()
        };
        let codec = codec_with(&[("/m/CD2-05 Outro.flac", tags)]);
        let extractor = Extractor::with_codec(codec, ExtractOptions::default());

        let extracted = extractor.extract_one(Path::new("/m/CD2-05 Outro.flac"));
        assert_eq!(extracted.record.tags.title.as_deref(), Some("Real Title"));
        assert_eq!(extracted.record.tags.track_number, Some(5));
        assert_eq!(extracted.record.tags.disc_number, Some(2));
        assert_eq!(
            extracted.filename_fields,
            vec![Field::TrackNumber, Field::DiscNumber]
        );
        assert_eq!(extracted.record.provenance.title, Source::Tag);
    }

    #[test]
    fn override_replaces_tags() {
        let tags = TagFields {
            title: Some("Tag Title".to_string()),
            artist: Some("Artist".to_string()),
            track_number: Some(9),
            ..Default::default()
        };
        let codec = codec_with(&[("/m/03 - File Title.ogg", tags)]);
        let extractor = Extractor::with_codec(
            codec,
            ExtractOptions {
                filename_override: true,
            },
        );

        let record = extractor
            .extract_one(Path::new("/m/03 - File Title.ogg"))
            .record;
        assert_eq!(record.tags.title.as_deref(), Some("File Title"));
        assert_eq!(record.tags.track_number, Some(3));
        assert_eq!(record.tags.artist.as_deref(), Some("Artist"));
        assert_eq!(record.provenance.title, Source::Filename);
        assert_eq!(record.provenance.descriptive, Source::Tag);
    }

    #[test]
    fn read_failure_is_annotated_not_fatal() {
        let extractor = Extractor::with_codec(TableCodec::default(), ExtractOptions::default());
        let paths = vec![
            PathBuf::from("/m/02 - Broken.wma"),
            PathBuf::from("/m/Plain.mp3"),
        ];

        let report = extractor.extract_all(&paths).unwrap();

        assert_eq!(report.scanned(), 2);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].path, paths[0]);
        assert_eq!(report.filename_fallbacks, 0);

        let broken = report.store.get(&paths[0]).unwrap();
        assert!(broken.tags.is_empty());
        assert_eq!(broken.provenance.title, Source::Tag);
    }

    #[test]
    fn read_failure_ignores_filename_override() {
        let extractor = Extractor::with_codec(
            TableCodec::default(),
            ExtractOptions {
                filename_override: true,
            },
        );

        let extracted = extractor.extract_one(Path::new("/m/CD1-04 - Broken.flac"));
        assert!(extracted.issue.is_some());
        assert!(extracted.record.tags.is_empty());
        assert!(extracted.filename_fields.is_empty());
    }

    #[test]
    fn store_keeps_input_order() {
        let extractor = Extractor::with_codec(TableCodec::default(), ExtractOptions::default());
        let paths = vec![PathBuf::from("/m/b.mp3"), PathBuf::from("/m/a.mp3")];

        let report = extractor.extract_all(&paths).unwrap();
        assert_eq!(report.store.paths(), paths);
    }

    #[test]
    fn iterator_can_stop_early() {
        let codec = codec_with(&[("/m/01 - A.mp3", TagFields::new())]);
        let extractor = Extractor::with_codec(codec, ExtractOptions::default());
        let paths = vec![
            PathBuf::from("/m/01 - A.mp3"),
            PathBuf::from("/m/02 - B.mp3"),
            PathBuf::from("/m/03 - C.mp3"),
        ];

        let first: Vec<_> = extractor.records(&paths).take(1).collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].record.tags.track_number, Some(1));
    }
}
