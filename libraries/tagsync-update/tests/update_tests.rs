/// Integration tests for the update engine against real files
use std::fs;
use std::path::{Path, PathBuf};
use tagsync_core::{MetadataRecord, RecordStore, Source, TagCodec, TagFields};
use tagsync_metadata::LoftyTagCodec;
use tagsync_update::{plan, UpdateEngine, UpdateError, UpdateOptions};
use tempfile::TempDir;

use test_helpers::{init_tracing, listing, write_flac};

fn numbered(path: &Path, title: &str, track: u32) -> MetadataRecord {
    MetadataRecord::with_tags(
        path,
        TagFields {
            title: Some(title.to_string()),
            track_number: Some(track),
            ..Default::default()
        },
        Source::Manual,
    )
}

fn rename_options(overwrite: bool) -> UpdateOptions {
    UpdateOptions {
        rename: true,
        overwrite,
        dry_run: false,
    }
}

#[test]
fn writes_tags_and_renames() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let source = write_flac(temp_dir.path(), "track.flac");
    let mut store = RecordStore::from_records([numbered(&source, "Intro", 1)]).unwrap();

    let report = UpdateEngine::new().apply(&plan(&store, rename_options(false)), false);

    assert_eq!(report.failed(), 0);
    assert_eq!(report.renamed(), 1);
    assert_eq!(listing(temp_dir.path()), vec!["01 - Intro.flac"]);

    let renamed = temp_dir.path().join("01 - Intro.flac");
    let tags = LoftyTagCodec::new().read(&renamed).unwrap();
    assert_eq!(tags.title.as_deref(), Some("Intro"));
    assert_eq!(tags.track_number, Some(1));

    report.refresh_store(&mut store).unwrap();
    let record = store.get(&renamed).unwrap();
    assert_eq!(record.provenance.title, Source::Tag);
    assert_eq!(record.provenance.numbering, Source::Tag);
}

#[test]
fn shared_target_fails_both_and_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_flac(temp_dir.path(), "a.flac");
    let b = write_flac(temp_dir.path(), "b.flac");
    let before_a = fs::read(&a).unwrap();
    let before_b = fs::read(&b).unwrap();
    let store =
        RecordStore::from_records([numbered(&a, "Same", 2), numbered(&b, "Same", 2)]).unwrap();

    let report = UpdateEngine::new().apply(&plan(&store, rename_options(true)), false);

    assert_eq!(report.failed(), 2);
    for outcome in report.failures() {
        assert!(matches!(outcome.error, Some(UpdateError::NameCollision { .. })));
        assert!(outcome.written.is_empty());
    }
    assert_eq!(listing(temp_dir.path()), vec!["a.flac", "b.flac"]);
    assert_eq!(fs::read(&a).unwrap(), before_a);
    assert_eq!(fs::read(&b).unwrap(), before_b);
}

#[test]
fn existing_destination_without_overwrite_collides() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_flac(temp_dir.path(), "a.flac");
    let taken = write_flac(temp_dir.path(), "01 - Intro.flac");
    let before = fs::read(&source).unwrap();
    let store = RecordStore::from_records([numbered(&source, "Intro", 1)]).unwrap();

    let report = UpdateEngine::new().apply(&plan(&store, rename_options(false)), false);

    let outcome = &report.outcomes[0];
    assert!(outcome.error.as_ref().is_some_and(UpdateError::is_collision));
    assert!(outcome.reason().unwrap().contains("already exists"));
    assert_eq!(fs::read(&source).unwrap(), before);
    assert!(taken.exists());
}

#[test]
fn overwrite_replaces_destination() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_flac(temp_dir.path(), "a.flac");
    write_flac(temp_dir.path(), "01 - Intro.flac");
    let store = RecordStore::from_records([numbered(&source, "Intro", 1)]).unwrap();

    let report = UpdateEngine::new().apply(&plan(&store, rename_options(true)), false);

    assert_eq!(report.failed(), 0);
    assert_eq!(listing(temp_dir.path()), vec!["01 - Intro.flac"]);
    let tags = LoftyTagCodec::new()
        .read(&temp_dir.path().join("01 - Intro.flac"))
        .unwrap();
    assert_eq!(tags.title.as_deref(), Some("Intro"));
}

#[test]
fn dry_run_matches_real_run_without_touching_disk() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_flac(temp_dir.path(), "good.flac");
    let a = write_flac(temp_dir.path(), "a.flac");
    let b = write_flac(temp_dir.path(), "b.flac");
    let missing = temp_dir.path().join("missing.flac");
    let store = RecordStore::from_records([
        numbered(&good, "Good", 1),
        numbered(&a, "Dup", 2),
        numbered(&b, "Dup", 2),
        numbered(&missing, "Gone", 3),
    ])
    .unwrap();
    let plan = plan(&store, rename_options(false));
    let engine = UpdateEngine::new();
    let before = fs::read(&good).unwrap();

    let dry = engine.apply(&plan, true);
    assert_eq!(listing(temp_dir.path()), vec!["a.flac", "b.flac", "good.flac"]);
    assert_eq!(fs::read(&good).unwrap(), before);
    assert!(dry.outcomes.iter().all(|o| o.simulated));

    let real = engine.apply(&plan, false);
    assert_eq!(
        listing(temp_dir.path()),
        vec!["01 - Good.flac", "a.flac", "b.flac"]
    );

    let shape = |report: &tagsync_update::UpdateReport| -> Vec<(PathBuf, bool, Option<PathBuf>)> {
        report
            .outcomes
            .iter()
            .map(|o| (o.path.clone(), o.is_success(), o.renamed_to.clone()))
            .collect()
    };
    assert_eq!(shape(&dry), shape(&real));
    assert_eq!(dry.failed(), 3);
}

#[test]
fn tag_only_update_keeps_names() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_flac(temp_dir.path(), "keep me.flac");
    let store = RecordStore::from_records([numbered(&source, "Title", 4)]).unwrap();

    let report = UpdateEngine::new().apply(&plan(&store, UpdateOptions::default()), false);

    assert_eq!(report.tags_written(), 1);
    assert_eq!(report.renamed(), 0);
    assert_eq!(listing(temp_dir.path()), vec!["keep me.flac"]);
}
