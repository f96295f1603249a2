/// Round-trip tests for the CSV transcoder
use std::path::{Path, PathBuf};
use tagsync_core::{BulkEdit, Field, MetadataRecord, RecordStore, Source, TagFields};
use tagsync_csv::{export_file, export_to_string, CsvImporter};
use tempfile::TempDir;

fn sample_store() -> RecordStore {
    let records = vec![
        MetadataRecord::with_tags(
            "/music/01 - Intro.mp3",
            TagFields {
                title: Some("Intro".to_string()),
                artist: Some("Earth, Wind & Fire".to_string()),
                album: Some("Live \"Unplugged\"".to_string()),
                year: Some("1999".to_string()),
                track_number: Some(1),
                ..Default::default()
            },
            Source::Tag,
        ),
        MetadataRecord::with_tags(
            "/music/CD2-05 Outro.flac",
            TagFields {
                title: Some("Outro".to_string()),
                genre: Some("Électronique".to_string()),
                track_number: Some(5),
                disc_number: Some(2),
                ..Default::default()
            },
            Source::Filename,
        ),
        MetadataRecord::new("/music/untitled.ogg"),
    ];
    RecordStore::from_records(records).unwrap()
}

#[test]
fn export_of_import_is_identical() {
    let csv = export_to_string(&sample_store()).unwrap();

    let imported = CsvImporter::new("/music").import(csv.as_bytes()).unwrap();
    let again = export_to_string(&imported).unwrap();

    assert_eq!(again, csv);
}

#[test]
fn import_preserves_values_and_order() {
    let original = sample_store();
    let csv = export_to_string(&original).unwrap();

    let imported = CsvImporter::new("/music").import(csv.as_bytes()).unwrap();

    assert_eq!(imported.paths(), original.paths());
    for (left, right) in original.iter().zip(imported.iter()) {
        assert_eq!(left.tags, right.tags);
        assert_eq!(right.provenance.title, Source::Manual);
    }
}

#[test]
fn edited_store_round_trips_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("metadata.csv");

    let mut store = sample_store();
    store
        .apply_edit(&BulkEdit::set(Field::AlbumArtist, "Various Artists"))
        .unwrap();
    export_file(&store, &csv_path).unwrap();

    let imported = CsvImporter::new("/music").import_file(&csv_path).unwrap();
    let record = imported.get(Path::new("/music/untitled.ogg")).unwrap();
    assert_eq!(record.tags.album_artist.as_deref(), Some("Various Artists"));
    assert_eq!(
        std::fs::read_to_string(&csv_path).unwrap(),
        export_to_string(&imported).unwrap()
    );
}

#[test]
fn recursive_library_round_trips() {
    let library = vec![
        PathBuf::from("/music/a/track.mp3"),
        PathBuf::from("/music/b/track.mp3"),
    ];
    let store = RecordStore::from_records(library.iter().map(MetadataRecord::new)).unwrap();
    let csv = export_to_string(&store).unwrap();

    let imported = CsvImporter::new("/music")
        .with_library(&library)
        .import(csv.as_bytes())
        .unwrap();

    assert_eq!(imported.paths(), library);
}
