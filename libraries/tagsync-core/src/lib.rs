//! Tagsync Core
//!
//! Core types, traits, and error handling shared by every Tagsync crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `MetadataRecord`, `TagFields`, `Field`, `Provenance`
//! - **Record Store**: `RecordStore` and `BulkEdit`
//! - **Core Traits**: `TagCodec`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use tagsync_core::{BulkEdit, Field, MetadataRecord, RecordStore};
//!
//! let mut store = RecordStore::new();
//! store.insert(MetadataRecord::new("/music/01 - Intro.mp3")).unwrap();
//! store.insert(MetadataRecord::new("/music/02 - Outro.mp3")).unwrap();
//!
//! let edited = store.apply_edit(&BulkEdit::set(Field::Album, "Live")).unwrap();
//! assert_eq!(edited, 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use store::{BulkEdit, RecordStore};
pub use traits::TagCodec;
pub use types::{
    parse_position, Field, FieldGroup, MetadataRecord, Provenance, Source, TagFields,
};
