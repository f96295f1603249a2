/// Command-level tests: extract, plan, update
use std::fs;
use tempfile::TempDir;

mod test_helpers;
use test_helpers::{init_tracing, listing, run, write_flac};

const HEADER: &str = "filename,title,artist,album,album_artist,genre,year,track_number,disc_number";

#[tokio::test]
async fn extract_writes_csv_with_filename_fallback() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "01 - Intro.flac");
    write_flac(root, "CD2-05 Outro.flac");

    let (failures, stdout) = run(&["extract", root.to_str().unwrap()]).await.unwrap();

    assert_eq!(failures, 0);
    assert!(stdout.contains("2 file(s) scanned"));
    let csv = fs::read_to_string(root.join("music_tags.csv")).unwrap();
    assert_eq!(
        csv,
        format!(
            "{}\n01 - Intro.flac,Intro,,,,,,1,\nCD2-05 Outro.flac,Outro,,,,,,5,2\n",
            HEADER
        )
    );
}

#[tokio::test]
async fn extract_json_reports_output() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "03. Song.flac");
    let output = root.join("tags.csv");

    let (_, stdout) = run(&[
        "extract",
        root.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--json",
    ])
    .await
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["scanned"], 1);
    assert_eq!(value["filename_fallbacks"], 1);
    assert_eq!(value["output"], output.to_str().unwrap());
    assert!(output.exists());
}

#[tokio::test]
async fn plan_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "CD2-05 Outro.flac");
    run(&["extract", root.to_str().unwrap()]).await.unwrap();
    let before = fs::read(root.join("CD2-05 Outro.flac")).unwrap();

    let (collisions, stdout) = run(&["plan", root.to_str().unwrap(), "--rename"])
        .await
        .unwrap();

    assert_eq!(collisions, 0);
    assert!(stdout.contains("-> "));
    assert!(stdout.contains("CD2-05 - Outro.flac"));
    assert!(stdout.contains("write: title, track_number, disc_number"));
    assert_eq!(
        listing(root),
        vec!["CD2-05 Outro.flac", "music_tags.csv"]
    );
    assert_eq!(fs::read(root.join("CD2-05 Outro.flac")).unwrap(), before);
}

#[tokio::test]
async fn plan_reports_collisions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "a.flac");
    write_flac(root, "b.flac");
    fs::write(
        root.join("music_tags.csv"),
        format!("{}\na.flac,Same,,,,,,2,\nb.flac,Same,,,,,,2,\n", HEADER),
    )
    .unwrap();

    let (collisions, stdout) = run(&["plan", root.to_str().unwrap(), "--rename"])
        .await
        .unwrap();

    assert_eq!(collisions, 2);
    assert!(stdout.contains("SKIP"));
    assert!(stdout.contains("2 file(s), 2 collision(s)"));
}

#[tokio::test]
async fn update_renames_and_rewrites_csv() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "01 - Intro.flac");
    write_flac(root, "CD2-05 Outro.flac");
    run(&["extract", root.to_str().unwrap()]).await.unwrap();

    let (failures, stdout) = run(&[
        "update",
        root.to_str().unwrap(),
        "--rename",
        "--set",
        "artist=The Band",
        "--set",
        "year=1999",
        "--only",
        "CD2-05 Outro.flac",
    ])
    .await
    .unwrap();

    assert_eq!(failures, 0, "{}", stdout);
    assert!(stdout.contains("Update complete: 2 files"));
    assert_eq!(
        listing(root),
        vec!["01 - Intro.flac", "CD2-05 - Outro.flac", "music_tags.csv"]
    );

    let csv = fs::read_to_string(root.join("music_tags.csv")).unwrap();
    assert_eq!(
        csv,
        format!(
            "{}\n01 - Intro.flac,Intro,,,,,,1,\nCD2-05 - Outro.flac,Outro,The Band,,,,1999,5,2\n",
            HEADER
        )
    );

    // Tags made it to disk
    run(&["extract", root.to_str().unwrap(), "-o", root.join("again.csv").to_str().unwrap()])
        .await
        .unwrap();
    let again = fs::read_to_string(root.join("again.csv")).unwrap();
    assert!(again.contains("CD2-05 - Outro.flac,Outro,The Band,,,,1999,5,2"));
}

#[tokio::test]
async fn dry_run_update_is_simulated() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "04. Song.flac");
    run(&["extract", root.to_str().unwrap()]).await.unwrap();
    let csv_before = fs::read_to_string(root.join("music_tags.csv")).unwrap();

    let (failures, stdout) = run(&[
        "update",
        root.to_str().unwrap(),
        "--rename",
        "--dry-run",
        "--set",
        "genre=Jazz",
        "--json",
    ])
    .await
    .unwrap();

    assert_eq!(failures, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["renamed"], 1);
    assert_eq!(value["outcomes"][0]["simulated"], true);
    assert_eq!(
        listing(root),
        vec!["04. Song.flac", "music_tags.csv"]
    );
    assert_eq!(fs::read_to_string(root.join("music_tags.csv")).unwrap(), csv_before);
}

#[tokio::test]
async fn structural_failures_are_errors() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_flac(root, "01 - Intro.flac");

    // No CSV yet
    let missing = run(&["update", root.to_str().unwrap()]).await;
    assert!(missing.is_err());

    // Unknown --only target
    run(&["extract", root.to_str().unwrap()]).await.unwrap();
    let unknown = run(&[
        "update",
        root.to_str().unwrap(),
        "--set",
        "album=X",
        "--only",
        "nope.flac",
    ])
    .await;
    assert!(unknown.is_err());

    // Invalid numeric value
    let invalid = run(&["update", root.to_str().unwrap(), "--set", "track_number=abc"]).await;
    assert!(invalid.is_err());

    // Missing directory
    assert!(run(&["extract", "/nonexistent/music"]).await.is_err());
}
