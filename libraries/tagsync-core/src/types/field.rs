//! Normalized tag fields and the write/read set shared by every codec

use serde::{Deserialize, Serialize};
use std::fmt;

/// One normalized metadata field
///
/// Declaration order is the column order of the tabular schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Track title
    Title,
    /// Track artist
    Artist,
    /// Album title
    Album,
    /// Album artist
    AlbumArtist,
    /// Genre
    Genre,
    /// Year (free-form text)
    Year,
    /// Track number
    TrackNumber,
    /// Disc number
    DiscNumber,
}

impl Field {
    /// All fields in schema order
    pub const ALL: [Field; 8] = [
        Field::Title,
        Field::Artist,
        Field::Album,
        Field::AlbumArtist,
        Field::Genre,
        Field::Year,
        Field::TrackNumber,
        Field::DiscNumber,
    ];

    /// Column name used by the tabular schema
    pub fn column(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::AlbumArtist => "album_artist",
            Field::Genre => "genre",
            Field::Year => "year",
            Field::TrackNumber => "track_number",
            Field::DiscNumber => "disc_number",
        }
    }

    /// Parse from a column name
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }

    /// Provenance group this field belongs to
    pub fn group(self) -> FieldGroup {
        match self {
            Field::Title => FieldGroup::Title,
            Field::TrackNumber | Field::DiscNumber => FieldGroup::Numbering,
            Field::Artist | Field::Album | Field::AlbumArtist | Field::Genre | Field::Year => {
                FieldGroup::Descriptive
            }
        }
    }

    /// Whether values of this field are positive integers
    pub fn is_numeric(self) -> bool {
        matches!(self, Field::TrackNumber | Field::DiscNumber)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Logical group of fields sharing one provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// The title
    Title,
    /// Track and disc numbers
    Numbering,
    /// Artist, album, album artist, genre, year
    Descriptive,
}

/// Parse a track or disc position
///
/// Accepts decimal digits only (leading zeros allowed). Zero is not a valid
/// position and parses as absent.
pub fn parse_position(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// A partial set of normalized tag values
///
/// Absent values are `None`, never empty strings. The same shape is used for
/// what a codec read from a file and for what a caller wants written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    /// Track title
    pub title: Option<String>,

    /// Track artist
    pub artist: Option<String>,

    /// Album title
    pub album: Option<String>,

    /// Album artist (or compilation artist)
    pub album_artist: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Year, free-form
    pub year: Option<String>,

    /// Track number (>= 1)
    pub track_number: Option<u32>,

    /// Disc number (>= 1)
    pub disc_number: Option<u32>,
}

impl TagFields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no field is present
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| !self.has(*field))
    }

    /// Check if a field is present
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Title => self.title.is_some(),
            Field::Artist => self.artist.is_some(),
            Field::Album => self.album.is_some(),
            Field::AlbumArtist => self.album_artist.is_some(),
            Field::Genre => self.genre.is_some(),
            Field::Year => self.year.is_some(),
            Field::TrackNumber => self.track_number.is_some(),
            Field::DiscNumber => self.disc_number.is_some(),
        }
    }

    /// Fields that are present, in schema order
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.has(*field))
            .collect()
    }

    /// Render a field as text (`None` when absent)
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Title => self.title.clone(),
            Field::Artist => self.artist.clone(),
            Field::Album => self.album.clone(),
            Field::AlbumArtist => self.album_artist.clone(),
            Field::Genre => self.genre.clone(),
            Field::Year => self.year.clone(),
            Field::TrackNumber => self.track_number.map(|n| n.to_string()),
            Field::DiscNumber => self.disc_number.map(|n| n.to_string()),
        }
    }

    /// Set a field from text
    ///
    /// Empty text clears the field. Numeric fields reject anything that is not
    /// a positive integer.
    pub fn set_text(&mut self, field: Field, value: Option<&str>) -> crate::Result<()> {
        let value = value.filter(|v| !v.is_empty());
        let position = || -> crate::Result<Option<u32>> {
            value
                .map(|text| {
                    parse_position(text)
                        .ok_or_else(|| crate::CoreError::invalid_value(field.column(), text))
                })
                .transpose()
        };

        match field {
            Field::Title => self.title = value.map(str::to_string),
            Field::Artist => self.artist = value.map(str::to_string),
            Field::Album => self.album = value.map(str::to_string),
            Field::AlbumArtist => self.album_artist = value.map(str::to_string),
            Field::Genre => self.genre = value.map(str::to_string),
            Field::Year => self.year = value.map(str::to_string),
            Field::TrackNumber => self.track_number = position()?,
            Field::DiscNumber => self.disc_number = position()?,
        }
        Ok(())
    }

    /// Overlay every present field of `other` onto `self`
    ///
    /// Fields absent in `other` are left untouched.
    pub fn overlay(&mut self, other: &TagFields) {
        for field in other.present_fields() {
            self.copy_from(other, field);
        }
    }

    /// Fill fields that are absent in `self` from `other`
    ///
    /// Returns the fields that were filled.
    pub fn fill_missing(&mut self, other: &TagFields) -> Vec<Field> {
        let mut filled = Vec::new();
        for field in other.present_fields() {
            if !self.has(field) {
                self.copy_from(other, field);
                filled.push(field);
            }
        }
        filled
    }

    /// Copy only the listed fields into a new set
    pub fn only(&self, fields: &[Field]) -> TagFields {
        let mut subset = TagFields::new();
        for field in fields {
            subset.copy_from(self, *field);
        }
        subset
    }

    fn copy_from(&mut self, other: &TagFields, field: Field) {
        match field {
            Field::Title => self.title.clone_from(&other.title),
            Field::Artist => self.artist.clone_from(&other.artist),
            Field::Album => self.album.clone_from(&other.album),
            Field::AlbumArtist => self.album_artist.clone_from(&other.album_artist),
            Field::Genre => self.genre.clone_from(&other.genre),
            Field::Year => self.year.clone_from(&other.year),
            Field::TrackNumber => self.track_number = other.track_number,
            Field::DiscNumber => self.disc_number = other.disc_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_column(field.column()), Some(field));
        }
        assert_eq!(Field::from_column("filename"), None);
    }

    #[test]
    fn parse_position_strips_leading_zeros() {
        assert_eq!(parse_position("01"), Some(1));
        assert_eq!(parse_position(" 12 "), Some(12));
        assert_eq!(parse_position("0"), None);
        assert_eq!(parse_position("00"), None);
        assert_eq!(parse_position("3/12"), None);
        assert_eq!(parse_position("abc"), None);
        assert_eq!(parse_position(""), None);
    }

    #[test]
    fn overlay_leaves_absent_fields_untouched() {
        let mut base = TagFields {
            title: Some("Old".to_string()),
            artist: Some("Artist".to_string()),
            track_number: Some(4),
            ..Default::default()
        };
        let update = TagFields {
            title: Some("New".to_string()),
            ..Default::default()
        };

        base.overlay(&update);

        assert_eq!(base.title.as_deref(), Some("New"));
        assert_eq!(base.artist.as_deref(), Some("Artist"));
        assert_eq!(base.track_number, Some(4));
    }

    #[test]
    fn fill_missing_reports_filled_fields() {
        let mut tags = TagFields {
            title: Some("Tagged".to_string()),
            ..Default::default()
        };
        let parsed = TagFields {
            title: Some("Parsed".to_string()),
            track_number: Some(2),
            ..Default::default()
        };

        let filled = tags.fill_missing(&parsed);

        assert_eq!(filled, vec![Field::TrackNumber]);
        assert_eq!(tags.title.as_deref(), Some("Tagged"));
        assert_eq!(tags.track_number, Some(2));
    }

    #[test]
    fn set_text_rejects_non_positive_numbers() {
        let mut tags = TagFields::new();
        assert!(tags.set_text(Field::TrackNumber, Some("0")).is_err());
        assert!(tags.set_text(Field::DiscNumber, Some("two")).is_err());

        tags.set_text(Field::TrackNumber, Some("07")).unwrap();
        assert_eq!(tags.track_number, Some(7));

        tags.set_text(Field::TrackNumber, Some("")).unwrap();
        assert_eq!(tags.track_number, None);
    }

    #[test]
    fn empty_text_is_absent() {
        let mut tags = TagFields::new();
        tags.set_text(Field::Genre, Some("")).unwrap();
        assert!(tags.is_empty());
        assert!(tags.present_fields().is_empty());
    }
}
