mod field;
mod record;
mod source;

pub use field::{parse_position, Field, FieldGroup, TagFields};
pub use record::MetadataRecord;
pub use source::{Provenance, Source};
