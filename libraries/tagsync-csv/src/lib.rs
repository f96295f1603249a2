//! Tagsync CSV
//!
//! Lossless transcoding between a `RecordStore` and a fixed nine-column CSV
//! schema used for editing metadata in a spreadsheet.
//!
//! ```text
//! filename,title,artist,album,album_artist,genre,year,track_number,disc_number
//! ```
//!
//! Only basenames are stored; importing needs a base directory (and optionally
//! the scanned file list) to rebuild paths. Exporting a store imported from a
//! CSV this crate wrote reproduces that CSV byte for byte.

mod error;
mod export;
mod import;

pub use error::{CsvError, Result};
pub use export::{export, export_file, export_to_string};
pub use import::CsvImporter;

/// Column holding the basename
pub const FILENAME_COLUMN: &str = "filename";

/// Header row, in order
pub const COLUMNS: [&str; 9] = [
    FILENAME_COLUMN,
    "title",
    "artist",
    "album",
    "album_artist",
    "genre",
    "year",
    "track_number",
    "disc_number",
];
