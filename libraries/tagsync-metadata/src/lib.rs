//! Tagsync Metadata
//!
//! Tag reading/writing, filename parsing, and directory scanning.
//!
//! This crate provides:
//! - A lofty-backed `TagCodec` with one variant per container (MP3, FLAC, M4A, OGG),
//!   plus a small ASF header codec for WMA
//! - Atomic read-modify-write of tags
//! - Filename parsing (`CD1-02 - Title`, `Track 03 Title`, `04. Title`)
//! - Deterministic directory scanning
//! - Extraction with filename fallback into a `RecordStore`
//!
//! # Example
//!
//! ```rust,no_run
//! use tagsync_metadata::{BatchScanner, ExtractOptions, Extractor};
//! use std::path::Path;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = BatchScanner::new().scan(Path::new("/music"), true)?;
//!
//! let extractor = Extractor::new(ExtractOptions::default());
//! let report = extractor.extract_all(&outcome.files)?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

mod asf;
mod codec;
mod error;
mod extract;
pub mod filename;
mod scanner;

pub use codec::{normalize_year, parse_numerator, ContainerFormat, LoftyTagCodec};
pub use error::{MetadataError, Result};
pub use extract::{ExtractIssue, ExtractOptions, ExtractReport, Extracted, Extractor};
pub use filename::{parse_path, parse_stem, render_stem, ParsedFilename};
pub use scanner::{BatchScanner, ScanIssue, ScanOutcome, AUDIO_EXTENSIONS};
