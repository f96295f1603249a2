//! ASF (WMA) header tags
//!
//! lofty cannot read ASF, so the two header objects that carry tags are
//! handled here:
//!
//! - Content Description: Title and Author
//! - Extended Content Description: named `WM/*` descriptors
//!
//! Every other header object and the data that follows the header are kept
//! byte for byte. Descriptors that tagsync does not map are kept too.

use crate::codec::{merge_numerator, normalize_year, parse_numerator};
use std::io::{self, Read, Write};
use tagsync_core::{Field, TagFields};

type Guid = [u8; 16];

/// 75B22630-668E-11CF-A6D9-00AA0062CE6C
const HEADER: Guid = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];

/// 8CABDCA1-A947-11CF-8EE4-00C00C205365
const FILE_PROPERTIES: Guid = [
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];

/// 75B22633-668E-11CF-A6D9-00AA0062CE6C
const CONTENT_DESCRIPTION: Guid = [
    0x33, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];

/// D2D0A440-E307-11D2-97F0-00A0C95EA850
const EXTENDED_CONTENT_DESCRIPTION: Guid = [
    0x40, 0xA4, 0xD0, 0xD2, 0x07, 0xE3, 0xD2, 0x11, 0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50,
];

const HEADER_LEN: usize = 30;
const OBJECT_HEADER_LEN: usize = 24;
const MAX_HEADER_SIZE: u64 = 64 * 1024 * 1024;

const ALBUM: &str = "WM/AlbumTitle";
const ALBUM_ARTIST: &str = "WM/AlbumArtist";
const GENRE: &str = "WM/Genre";
const YEAR: &str = "WM/Year";
const TRACK_NUMBER: &str = "WM/TrackNumber";
/// Zero-based track index written by old encoders
const TRACK_INDEX: &str = "WM/Track";
const PART_OF_SET: &str = "WM/PartOfSet";

/// Descriptor value types
const KIND_TEXT: u16 = 0;
const KIND_DWORD: u16 = 3;
const KIND_QWORD: u16 = 4;
const KIND_WORD: u16 = 5;

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Little-endian cursor over an object body
struct Bytes<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Bytes<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| invalid("ASF object is truncated"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> io::Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u64(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn guid(&mut self) -> io::Result<Guid> {
        let mut guid = [0u8; 16];
        guid.copy_from_slice(self.take(16)?);
        Ok(guid)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

/// UTF-16LE with a terminating null, refused when its length overflows a `u16`
fn encode_utf16(text: &str) -> Option<Vec<u8>> {
    let mut bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.extend_from_slice(&[0, 0]);
    (bytes.len() <= usize::from(u16::MAX)).then_some(bytes)
}

fn push_sized(out: &mut Vec<u8>, bytes: &[u8]) {
    // Values come from `encode_utf16` or were parsed with a u16 length
    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(bytes);
}

/// Title, author, copyright, description, rating
#[derive(Debug, Clone, Default, PartialEq)]
struct ContentDescription {
    strings: [Vec<u8>; 5],
}

impl ContentDescription {
    const TITLE: usize = 0;
    const AUTHOR: usize = 1;

    fn parse(body: &[u8]) -> io::Result<Self> {
        let mut bytes = Bytes::new(body);
        let mut lengths = [0usize; 5];
        for len in &mut lengths {
            *len = usize::from(bytes.u16()?);
        }
        let mut description = Self::default();
        for (slot, len) in description.strings.iter_mut().zip(lengths) {
            *slot = bytes.take(len)?.to_vec();
        }
        Ok(description)
    }

    fn text(&self, index: usize) -> Option<String> {
        Some(decode_utf16(&self.strings[index])).filter(|s| !s.trim().is_empty())
    }

    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for string in &self.strings {
            body.extend_from_slice(&(string.len() as u16).to_le_bytes());
        }
        for string in &self.strings {
            body.extend_from_slice(string);
        }
        body
    }
}

/// One named value of the Extended Content Description object
#[derive(Debug, Clone, PartialEq)]
struct Descriptor {
    name: String,
    kind: u16,
    value: Vec<u8>,
}

impl Descriptor {
    fn text(name: &str, value: &str) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            kind: KIND_TEXT,
            value: encode_utf16(value)?,
        })
    }

    fn dword(name: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: KIND_DWORD,
            value: value.to_le_bytes().to_vec(),
        }
    }

    /// Value rendered as text; binary and boolean values have none
    fn as_text(&self) -> Option<String> {
        let v = &self.value;
        let text = match (self.kind, v.len()) {
            (KIND_TEXT, _) => decode_utf16(v),
            (KIND_DWORD, 4) => u32::from_le_bytes([v[0], v[1], v[2], v[3]]).to_string(),
            (KIND_WORD, 2) => u16::from_le_bytes([v[0], v[1]]).to_string(),
            (KIND_QWORD, 8) => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(v);
                u64::from_le_bytes(buf).to_string()
            }
            _ => return None,
        };
        Some(text).filter(|s| !s.trim().is_empty())
    }
}

fn parse_descriptors(body: &[u8]) -> io::Result<Vec<Descriptor>> {
    let mut bytes = Bytes::new(body);
    let count = bytes.u16()?;
    let mut descriptors = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name_len = usize::from(bytes.u16()?);
        let name = decode_utf16(bytes.take(name_len)?);
        let kind = bytes.u16()?;
        let value_len = usize::from(bytes.u16()?);
        let value = bytes.take(value_len)?.to_vec();
        descriptors.push(Descriptor { name, kind, value });
    }
    Ok(descriptors)
}

fn encode_descriptors(descriptors: &[Descriptor]) -> Option<Vec<u8>> {
    let count = u16::try_from(descriptors.len()).ok()?;
    let mut body = count.to_le_bytes().to_vec();
    for descriptor in descriptors {
        push_sized(&mut body, &encode_utf16(&descriptor.name)?);
        body.extend_from_slice(&descriptor.kind.to_le_bytes());
        push_sized(&mut body, &descriptor.value);
    }
    Some(body)
}

/// Parsed ASF header object
#[derive(Debug, Clone)]
pub(crate) struct AsfHeader {
    /// Size of the header object as found in the file
    size: u64,
    reserved: [u8; 2],
    /// Child objects in file order
    objects: Vec<(Guid, Vec<u8>)>,
    content: Option<ContentDescription>,
    descriptors: Option<Vec<Descriptor>>,
}

impl AsfHeader {
    /// Read the header object, leaving `reader` at the first byte after it
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut top = [0u8; HEADER_LEN];
        reader.read_exact(&mut top).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => invalid("not an ASF file"),
            _ => e,
        })?;

        let mut bytes = Bytes::new(&top);
        if bytes.guid()? != HEADER {
            return Err(invalid("not an ASF file"));
        }
        let size = bytes.u64()?;
        if size < HEADER_LEN as u64 || size > MAX_HEADER_SIZE {
            return Err(invalid(format!("ASF header size {} is out of range", size)));
        }
        let reserved = [top[28], top[29]];

        let mut children = vec![0u8; size as usize - HEADER_LEN];
        reader
            .read_exact(&mut children)
            .map_err(|_| invalid("ASF header is truncated"))?;

        let mut objects = Vec::new();
        let mut content = None;
        let mut descriptors = None;
        let mut bytes = Bytes::new(&children);
        while !bytes.is_empty() {
            let guid = bytes.guid()?;
            let object_size = bytes.u64()?;
            let body_len = object_size
                .checked_sub(OBJECT_HEADER_LEN as u64)
                .ok_or_else(|| invalid("ASF object size is too small"))?;
            let body = bytes.take(body_len as usize)?.to_vec();

            match guid {
                CONTENT_DESCRIPTION if content.is_none() => {
                    content = Some(ContentDescription::parse(&body)?);
                }
                EXTENDED_CONTENT_DESCRIPTION if descriptors.is_none() => {
                    descriptors = Some(parse_descriptors(&body)?);
                }
                _ => {}
            }
            objects.push((guid, body));
        }

        Ok(Self {
            size,
            reserved,
            objects,
            content,
            descriptors,
        })
    }

    fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors
            .as_ref()?
            .iter()
            .find(|descriptor| descriptor.name == name)
    }

    fn descriptor_text(&self, name: &str) -> Option<String> {
        self.descriptor(name).and_then(Descriptor::as_text)
    }

    /// Normalized fields carried by the header
    pub(crate) fn fields(&self) -> TagFields {
        let content = self.content.as_ref();
        let track_index = || {
            self.descriptor_text(TRACK_INDEX)
                .and_then(|t| t.trim().parse::<u32>().ok())
                .map(|index| index + 1)
        };

        TagFields {
            title: content.and_then(|c| c.text(ContentDescription::TITLE)),
            artist: content.and_then(|c| c.text(ContentDescription::AUTHOR)),
            album: self.descriptor_text(ALBUM),
            album_artist: self.descriptor_text(ALBUM_ARTIST),
            genre: self.descriptor_text(GENRE),
            year: self.descriptor_text(YEAR).map(|y| normalize_year(&y)),
            track_number: self
                .descriptor_text(TRACK_NUMBER)
                .and_then(|t| parse_numerator(&t))
                .or_else(track_index),
            disc_number: self
                .descriptor_text(PART_OF_SET)
                .and_then(|d| parse_numerator(&d)),
        }
    }

    /// Write the present fields into the header
    ///
    /// Returns the first field whose value does not fit; the header must then
    /// be discarded.
    pub(crate) fn apply(&mut self, fields: &TagFields) -> std::result::Result<(), Field> {
        for (field, index) in [
            (Field::Title, ContentDescription::TITLE),
            (Field::Artist, ContentDescription::AUTHOR),
        ] {
            if let Some(value) = fields.text(field) {
                let encoded = encode_utf16(&value).ok_or(field)?;
                self.content.get_or_insert_with(Default::default).strings[index] = encoded;
            }
        }

        for (field, name) in [
            (Field::Album, ALBUM),
            (Field::AlbumArtist, ALBUM_ARTIST),
            (Field::Genre, GENRE),
            (Field::Year, YEAR),
        ] {
            if let Some(value) = fields.text(field) {
                let descriptor = Descriptor::text(name, &value).ok_or(field)?;
                self.set_descriptor(descriptor);
            }
        }

        if let Some(track) = fields.track_number {
            let existing = self.descriptor(TRACK_NUMBER);
            let descriptor = match existing {
                Some(d) if d.kind == KIND_TEXT => {
                    let merged = merge_numerator(d.as_text().as_deref(), track);
                    Descriptor::text(TRACK_NUMBER, &merged).ok_or(Field::TrackNumber)?
                }
                Some(_) => Descriptor::dword(TRACK_NUMBER, track),
                None => Descriptor::text(TRACK_NUMBER, &track.to_string())
                    .ok_or(Field::TrackNumber)?,
            };
            self.set_descriptor(descriptor);
            // A stale zero-based index would disagree with the new number
            self.remove_descriptor(TRACK_INDEX);
        }

        if let Some(disc) = fields.disc_number {
            let merged = merge_numerator(self.descriptor_text(PART_OF_SET).as_deref(), disc);
            let descriptor = Descriptor::text(PART_OF_SET, &merged).ok_or(Field::DiscNumber)?;
            self.set_descriptor(descriptor);
        }

        Ok(())
    }

    /// Replace the first descriptor of the same name, dropping duplicates
    fn set_descriptor(&mut self, descriptor: Descriptor) {
        let descriptors = self.descriptors.get_or_insert_with(Vec::new);
        match descriptors.iter().position(|d| d.name == descriptor.name) {
            Some(index) => {
                let name = descriptor.name.clone();
                descriptors[index] = descriptor;
                let mut seen = false;
                descriptors.retain(|d| {
                    if d.name != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => descriptors.push(descriptor),
        }
    }

    fn remove_descriptor(&mut self, name: &str) {
        if let Some(descriptors) = self.descriptors.as_mut() {
            descriptors.retain(|d| d.name != name);
        }
    }

    /// Encode the header object for a file currently `file_len` bytes long
    ///
    /// The File Properties object records the total file size, which moves
    /// with the header size.
    fn encode(&self, file_len: u64) -> io::Result<Vec<u8>> {
        let mut objects = self.objects.clone();
        if let Some(content) = &self.content {
            replace_or_push(&mut objects, CONTENT_DESCRIPTION, content.encode());
        }
        if let Some(descriptors) = &self.descriptors {
            let body = encode_descriptors(descriptors)
                .ok_or_else(|| invalid("too many extended content descriptors"))?;
            replace_or_push(&mut objects, EXTENDED_CONTENT_DESCRIPTION, body);
        }

        let children_len: usize = objects
            .iter()
            .map(|(_, body)| OBJECT_HEADER_LEN + body.len())
            .sum();
        let new_size = (HEADER_LEN + children_len) as u64;
        let new_file_len = file_len.saturating_sub(self.size).saturating_add(new_size);

        let mut out = Vec::with_capacity(HEADER_LEN + children_len);
        out.extend_from_slice(&HEADER);
        out.extend_from_slice(&new_size.to_le_bytes());
        out.extend_from_slice(&(objects.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.reserved);

        for (guid, body) in &mut objects {
            if *guid == FILE_PROPERTIES && body.len() >= 24 {
                body[16..24].copy_from_slice(&new_file_len.to_le_bytes());
            }
            out.extend_from_slice(guid.as_slice());
            out.extend_from_slice(&((OBJECT_HEADER_LEN + body.len()) as u64).to_le_bytes());
            out.extend_from_slice(body);
        }

        Ok(out)
    }

    /// Write the encoded header followed by the rest of the original stream
    pub(crate) fn write_with_rest<R: Read, W: Write>(
        &self,
        file_len: u64,
        rest: &mut R,
        out: &mut W,
    ) -> io::Result<()> {
        out.write_all(&self.encode(file_len)?)?;
        io::copy(rest, out)?;
        out.flush()
    }
}

fn replace_or_push(objects: &mut Vec<(Guid, Vec<u8>)>, guid: Guid, body: Vec<u8>) {
    match objects.iter_mut().find(|(g, _)| *g == guid) {
        Some((_, existing)) => *existing = body,
        None => objects.push((guid, body)),
    }
}
