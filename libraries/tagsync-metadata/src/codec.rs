//! Tag codec implementation using lofty
//!
//! Each supported container is one `ContainerFormat` variant. The variant
//! decides which tag dialect is read and written:
//!
//! | Format | Extension | Tag dialect |
//! |--------|-----------|-------------|
//! | MP3    | `mp3`     | ID3v2 |
//! | FLAC   | `flac`    | Vorbis comments |
//! | MP4    | `m4a`     | iTunes ilst atoms |
//! | Ogg    | `ogg`     | Vorbis comments |
//! | WMA    | `wma`     | ASF content descriptions (see `asf`) |
//!
//! Writes go through the container's own tag type, so frames and items that
//! tagsync does not map (UFID, POPM, custom comments, cover art) are written
//! back unchanged. They are staged on a sibling temporary copy and moved over
//! the original in one rename, so a failed write never leaves a half-tagged
//! file behind.

use crate::asf::AsfHeader;
use crate::error::{MetadataError, Result};
use lofty::flac::FlacFile;
use lofty::id3::v2::Id3v2Tag;
use lofty::mp4::{Ilst, Mp4File};
use lofty::mpeg::MpegFile;
use lofty::ogg::{OggPictureStorage, VorbisComments, VorbisFile};
use lofty::{
    AudioFile, ItemKey, LoftyError, MergeTag, ParseOptions, Picture, PictureInformation, Probe,
    SplitTag, Tag, TagExt, TagType, TaggedFileExt,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use tagsync_core::{parse_position, Field, TagCodec, TagFields};
use tracing::debug;

/// Supported audio containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Mp3,
    Flac,
    M4a,
    Ogg,
    Wma,
}

impl ContainerFormat {
    /// Every supported container
    pub const ALL: [ContainerFormat; 5] = [
        ContainerFormat::Mp3,
        ContainerFormat::Flac,
        ContainerFormat::M4a,
        ContainerFormat::Ogg,
        ContainerFormat::Wma,
    ];

    /// Select the container from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            "m4a" => Some(Self::M4a),
            "ogg" => Some(Self::Ogg),
            "wma" => Some(Self::Wma),
            _ => None,
        }
    }

    /// Select the container for a path
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| MetadataError::UnsupportedFormat(path.display().to_string()))
    }

    /// Canonical extension
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Wma => "wma",
        }
    }

    /// lofty tag dialect for this container (`None` for WMA, which lofty cannot read)
    pub fn tag_type(self) -> Option<TagType> {
        match self {
            Self::Mp3 => Some(TagType::Id3v2),
            Self::Flac | Self::Ogg => Some(TagType::VorbisComments),
            Self::M4a => Some(TagType::Mp4Ilst),
            Self::Wma => None,
        }
    }

    /// Read the fields present in the file's tag
    pub fn read(self, path: &Path) -> Result<TagFields> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let Some(tag_type) = self.tag_type() else {
            let header = File::open(path)
                .map(BufReader::new)
                .and_then(|mut reader| AsfHeader::read_from(&mut reader))
                .map_err(|e| MetadataError::ParseError(format!("{}: {}", path.display(), e)))?;
            return Ok(header.fields());
        };

        let tagged_file = Probe::open(path)
            .and_then(|probe| {
                probe
                    .options(ParseOptions::new().read_properties(false))
                    .read()
            })
            .map_err(|e| MetadataError::ParseError(format!("{}: {}", path.display(), e)))?;

        // Prefer the container's own dialect, then whatever else is there
        let tag = tagged_file
            .tag(tag_type)
            .or_else(|| tagged_file.primary_tag())
            .or_else(|| tagged_file.first_tag());

        Ok(tag.map(fields_from_tag).unwrap_or_default())
    }

    /// Overlay `fields` onto the file's tag (read-modify-write)
    pub fn write(self, path: &Path, fields: &TagFields, dry_run: bool) -> Result<()> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let metadata = fs::metadata(path).map_err(|e| io_failure(path, e))?;
        if metadata.permissions().readonly() {
            return Err(MetadataError::PermissionDenied(format!(
                "{} is read-only",
                path.display()
            )));
        }

        let mut source = File::open(path).map_err(|e| io_failure(path, e))?;
        let staged_tag = match self.tag_type() {
            Some(_) => StagedTag::Native(self.overlay_native(path, &mut source, fields)?),
            None => {
                let mut reader = BufReader::new(source);
                let mut header =
                    AsfHeader::read_from(&mut reader).map_err(|e| unreadable(path, e))?;
                header
                    .apply(fields)
                    .map_err(|field| self.refused(path, field))?;
                StagedTag::Asf(header, reader)
            }
        };

        if dry_run || fields.is_empty() {
            debug!("Tag write for {:?} checked, not persisted", path);
            return Ok(());
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = tempfile::Builder::new()
            .prefix(".tagsync-")
            .suffix(&format!(".{}", self.extension()))
            .tempfile_in(dir)
            .map_err(|e| io_failure(dir, e))?;

        match staged_tag {
            StagedTag::Native(tag) => {
                fs::copy(path, staged.path()).map_err(|e| io_failure(path, e))?;
                tag.save_to_path(staged.path())
                    .map_err(|e| MetadataError::WriteError(format!("{}: {}", path.display(), e)))?;
            }
            StagedTag::Asf(header, mut rest) => {
                let out = OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(staged.path())
                    .map_err(|e| io_failure(staged.path(), e))?;
                header
                    .write_with_rest(metadata.len(), &mut rest, &mut BufWriter::new(out))
                    .map_err(|e| io_failure(path, e))?;
            }
        }
        fs::set_permissions(staged.path(), metadata.permissions())
            .map_err(|e| io_failure(staged.path(), e))?;

        staged
            .persist(path)
            .map_err(|e| io_failure(path, e.error))?;

        debug!("Wrote {} tag field(s) to {:?}", fields.present_fields().len(), path);

        Ok(())
    }

    /// Read the container's own tag and overlay `fields` onto it
    fn overlay_native(
        self,
        path: &Path,
        source: &mut File,
        fields: &TagFields,
    ) -> Result<NativeTag> {
        let options = ParseOptions::new().read_properties(false);
        let parse_failed = |e: LoftyError| unreadable(path, e);
        let refused = |field: Field| self.refused(path, field);

        let tag = match self {
            Self::Mp3 => {
                let mpeg = MpegFile::read_from(source, options).map_err(parse_failed)?;
                let id3v2 = mpeg.id3v2().cloned().unwrap_or_default();
                NativeTag::Id3v2(overlay(id3v2, fields).map_err(refused)?)
            }
            Self::Flac => {
                let mut flac = FlacFile::read_from(source, options).map_err(parse_failed)?;
                let mut comments = flac.vorbis_comments().cloned().unwrap_or_default();
                let mut pictures = comments.remove_pictures();
                // FLAC keeps pictures in their own blocks, which a comment write replaces
                pictures.extend(flac.remove_pictures());
                let comments = overlay(comments, fields).map_err(refused)?;
                NativeTag::Vorbis(restore_pictures(comments, pictures).map_err(parse_failed)?)
            }
            Self::Ogg => {
                let vorbis = VorbisFile::read_from(source, options).map_err(parse_failed)?;
                let mut comments = vorbis.vorbis_comments().clone();
                let pictures = comments.remove_pictures();
                let comments = overlay(comments, fields).map_err(refused)?;
                NativeTag::Vorbis(restore_pictures(comments, pictures).map_err(parse_failed)?)
            }
            Self::M4a => {
                let mp4 = Mp4File::read_from(source, options).map_err(parse_failed)?;
                let ilst = mp4.ilst().cloned().unwrap_or_default();
                NativeTag::Ilst(overlay(ilst, fields).map_err(refused)?)
            }
            Self::Wma => {
                return Err(MetadataError::UnsupportedFormat(format!(
                    "{}: no lofty tag for {} files",
                    path.display(),
                    self.extension()
                )))
            }
        };

        Ok(tag)
    }

    fn refused(self, path: &Path, field: Field) -> MetadataError {
        MetadataError::WriteError(format!(
            "{}: {} cannot be stored in {} tags",
            path.display(),
            field,
            self.extension()
        ))
    }
}

fn unreadable(path: &Path, err: impl std::fmt::Display) -> MetadataError {
    MetadataError::WriteError(format!(
        "{}: cannot parse existing tags: {}",
        path.display(),
        err
    ))
}

/// A container's own tag, including what the generic `Tag` cannot express
#[derive(Debug)]
enum NativeTag {
    Id3v2(Id3v2Tag),
    Vorbis(VorbisComments),
    Ilst(Ilst),
}

impl NativeTag {
    fn save_to_path(&self, path: &Path) -> lofty::Result<()> {
        match self {
            Self::Id3v2(tag) => tag.save_to_path(path),
            Self::Vorbis(tag) => tag.save_to_path(path),
            Self::Ilst(tag) => tag.save_to_path(path),
        }
    }
}

/// An updated tag waiting to be written to the staged copy
enum StagedTag {
    Native(NativeTag),
    /// New ASF header plus the original stream positioned after the old one
    Asf(AsfHeader, BufReader<File>),
}

/// Apply `fields` through the generic view, keeping everything it does not map
fn overlay<T>(native: T, fields: &TagFields) -> std::result::Result<T, Field>
where
    T: SplitTag,
    T::Remainder: MergeTag<Merged = T>,
{
    let (remainder, mut tag) = native.split_tag();
    apply_fields(&mut tag, fields)?;
    Ok(remainder.merge_tag(tag))
}

/// Tag codec backed by lofty, dispatching on the file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagCodec;

impl LoftyTagCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }
}

impl TagCodec for LoftyTagCodec {
    fn read(&self, path: &Path) -> tagsync_core::Result<TagFields> {
        Ok(ContainerFormat::from_path(path)?.read(path)?)
    }

    fn write(&self, path: &Path, fields: &TagFields, dry_run: bool) -> tagsync_core::Result<()> {
        Ok(ContainerFormat::from_path(path)?.write(path, fields, dry_run)?)
    }
}

/// Put pictures back with their stored details instead of re-deriving them
fn restore_pictures(
    mut comments: VorbisComments,
    pictures: Vec<(Picture, PictureInformation)>,
) -> lofty::Result<VorbisComments> {
    for (picture, info) in pictures {
        comments.insert_picture(picture, Some(info))?;
    }
    Ok(comments)
}

/// Extract normalized fields from a lofty tag
fn fields_from_tag(tag: &Tag) -> TagFields {
    TagFields {
        title: text(tag, &ItemKey::TrackTitle),
        artist: text(tag, &ItemKey::TrackArtist),
        album: text(tag, &ItemKey::AlbumTitle),
        album_artist: text(tag, &ItemKey::AlbumArtist),
        genre: text(tag, &ItemKey::Genre),
        year: text(tag, &ItemKey::RecordingDate)
            .or_else(|| text(tag, &ItemKey::Year))
            .map(|y| normalize_year(&y)),
        track_number: text(tag, &ItemKey::TrackNumber).and_then(|t| parse_numerator(&t)),
        disc_number: text(tag, &ItemKey::DiscNumber).and_then(|d| parse_numerator(&d)),
    }
}

fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

/// Write the present fields into the tag
///
/// Returns the first field the tag dialect refused. The caller must then
/// discard the tag so nothing is persisted.
fn apply_fields(tag: &mut Tag, fields: &TagFields) -> std::result::Result<(), Field> {
    let mut insert = |key: ItemKey, field: Field, value: String| {
        if tag.insert_text(key, value) {
            Ok(())
        } else {
            Err(field)
        }
    };

    if let Some(title) = &fields.title {
        insert(ItemKey::TrackTitle, Field::Title, title.clone())?;
    }
    if let Some(artist) = &fields.artist {
        insert(ItemKey::TrackArtist, Field::Artist, artist.clone())?;
    }
    if let Some(album) = &fields.album {
        insert(ItemKey::AlbumTitle, Field::Album, album.clone())?;
    }
    if let Some(album_artist) = &fields.album_artist {
        insert(ItemKey::AlbumArtist, Field::AlbumArtist, album_artist.clone())?;
    }
    if let Some(genre) = &fields.genre {
        insert(ItemKey::Genre, Field::Genre, genre.clone())?;
    }

    if let Some(year) = &fields.year {
        tag.insert_text(ItemKey::RecordingDate, year.clone())
            .then_some(())
            .ok_or(Field::Year)?;
        // A stale YEAR item would shadow the new date in some players
        tag.remove_key(&ItemKey::Year);
    }

    if let Some(track) = fields.track_number {
        let value = merge_numerator(tag.get_string(&ItemKey::TrackNumber), track);
        tag.insert_text(ItemKey::TrackNumber, value)
            .then_some(())
            .ok_or(Field::TrackNumber)?;
    }
    if let Some(disc) = fields.disc_number {
        let value = merge_numerator(tag.get_string(&ItemKey::DiscNumber), disc);
        tag.insert_text(ItemKey::DiscNumber, value)
            .then_some(())
            .ok_or(Field::DiscNumber)?;
    }

    Ok(())
}

/// Parse the numerator of an optional `N/total` pair
pub fn parse_numerator(text: &str) -> Option<u32> {
    let numerator = text.split('/').next().unwrap_or_default();
    parse_position(numerator)
}

/// Replace the numerator of an existing `N/total` value, keeping the total
pub(crate) fn merge_numerator(existing: Option<&str>, number: u32) -> String {
    match existing.and_then(|e| e.split_once('/')) {
        Some((_, total)) if !total.trim().is_empty() => format!("{}/{}", number, total.trim()),
        _ => number.to_string(),
    }
}

/// Reduce a full date (`YYYY-MM-DD`, `YYYY-MM-DDThh:mm`) to its year
///
/// Text that does not start with a four digit year is kept verbatim.
pub fn normalize_year(text: &str) -> String {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    let has_year_prefix = bytes.len() >= 4 && bytes[..4].iter().all(u8::is_ascii_digit);
    let is_date = has_year_prefix && matches!(bytes.get(4), None | Some(b'-' | b'/' | b'.' | b'T'));

    if is_date {
        trimmed[..4].to_string()
    } else {
        text.to_string()
    }
}

fn io_failure(path: &Path, err: io::Error) -> MetadataError {
    match err.kind() {
        io::ErrorKind::NotFound => MetadataError::FileNotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => {
            MetadataError::PermissionDenied(format!("{}: {}", path.display(), err))
        }
        _ => MetadataError::WriteError(format!("{}: {}", path.display(), err)),
    }
}
