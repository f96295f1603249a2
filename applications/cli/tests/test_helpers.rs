#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tagsync_cli::{cli::Cli, commands, config::TagsyncConfig};

static INIT: Once = Once::new();

pub fn init_tracing() {
    // Initialize logging once
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Write an untagged FLAC file (STREAMINFO only)
pub fn write_flac(dir: &Path, name: &str) -> PathBuf {
    let mut bytes = b"fLaC".to_vec();
    bytes.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
    bytes.extend_from_slice(&4096u16.to_be_bytes());
    bytes.extend_from_slice(&4096u16.to_be_bytes());
    bytes.extend_from_slice(&[0u8; 6]);
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36);
    bytes.extend_from_slice(&packed.to_be_bytes());
    bytes.extend_from_slice(&[0u8; 16]);

    let path = dir.join(name);
    fs::write(&path, bytes).expect("Failed to write FLAC fixture");
    path
}

/// Sorted file names in a directory
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list directory")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Parse `args` and run the command with default configuration
///
/// Returns the failure count and everything written to stdout.
pub async fn run(args: &[&str]) -> anyhow::Result<(usize, String)> {
    let mut argv = vec!["tagsync"];
    argv.extend_from_slice(args);
    let cli = <Cli as clap::Parser>::try_parse_from(argv)?;

    let mut out = Vec::new();
    let failures = commands::run(&cli, &TagsyncConfig::default(), &mut out).await?;
    Ok((failures, String::from_utf8(out)?))
}
