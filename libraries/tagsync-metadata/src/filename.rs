//! Filename parser
//!
//! Derives disc, track and title from a bare filename (no directory, no
//! extension). Patterns are tried most specific first; the first full match
//! whose numbers are valid wins. A stem that matches nothing is taken whole
//! as the title.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tagsync_core::{parse_position, TagFields};

/// Which value a capture group holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Disc,
    Track,
    Title,
}

/// A declarative filename rule
#[derive(Debug)]
pub struct FilenamePattern {
    /// Short name used in debug output
    pub name: &'static str,
    regex: Regex,
    captures: &'static [Capture],
}

impl FilenamePattern {
    fn new(name: &'static str, pattern: &str, captures: &'static [Capture]) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("filename pattern must compile"),
            captures,
        }
    }

    /// Match a stem, returning `None` unless every capture is usable
    fn apply(&self, stem: &str) -> Option<ParsedFilename> {
        let caps = self.regex.captures(stem)?;
        let mut parsed = ParsedFilename::default();

        for (index, capture) in self.captures.iter().enumerate() {
            let text = caps.get(index + 1)?.as_str();
            match capture {
                Capture::Disc => parsed.disc = Some(parse_position(text)?),
                Capture::Track => parsed.track = Some(parse_position(text)?),
                Capture::Title => {
                    let title = clean_title(text);
                    if title.is_empty() {
                        return None;
                    }
                    parsed.title = Some(title);
                }
            }
        }

        Some(parsed)
    }
}

/// Recognized patterns in priority order
pub static PATTERNS: Lazy<Vec<FilenamePattern>> = Lazy::new(|| {
    vec![
        // CD2-05 Outro, Disc 1-03 - Title, CD1.07_Title
        FilenamePattern::new(
            "disc-track-title",
            r"(?i)^(?:CD|Disc)\s*(\d{1,2})\s*[._-]\s*(\d{1,3})[\s._-]+(.+)$",
            &[Capture::Disc, Capture::Track, Capture::Title],
        ),
        // Track 03 - Title, Track 3. Title, Track03 Title
        FilenamePattern::new(
            "track-word-title",
            r"(?i)^Track\s*(\d{1,3})[\s._-]+(.+)$",
            &[Capture::Track, Capture::Title],
        ),
        // 03 - Title, 3. Title, 03_Title
        FilenamePattern::new(
            "track-title",
            r"^(\d{1,3})[\s._-]+(.+)$",
            &[Capture::Track, Capture::Title],
        ),
    ]
});

/// Values derived from a filename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilename {
    pub disc: Option<u32>,
    pub track: Option<u32>,
    pub title: Option<String>,
}

impl ParsedFilename {
    /// Check if no numeric prefix was recognized
    pub fn is_title_only(&self) -> bool {
        self.track.is_none() && self.disc.is_none()
    }

    /// Convert into a partial field set
    pub fn to_tags(&self) -> TagFields {
        TagFields {
            title: self.title.clone(),
            track_number: self.track,
            disc_number: self.disc,
            ..Default::default()
        }
    }
}

/// Parse a bare filename stem
pub fn parse_stem(stem: &str) -> ParsedFilename {
    for pattern in PATTERNS.iter() {
        if let Some(parsed) = pattern.apply(stem) {
            tracing::trace!("{:?} matched pattern {}", stem, pattern.name);
            return parsed;
        }
    }

    let title = clean_title(stem);
    ParsedFilename {
        title: (!title.is_empty()).then_some(title),
        ..Default::default()
    }
}

/// Parse the stem of a path
pub fn parse_path(path: &Path) -> ParsedFilename {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    parse_stem(stem)
}

/// Trim whitespace and separator punctuation from a title
///
/// A title without any whitespace has its underscores turned into spaces.
pub fn clean_title(text: &str) -> String {
    let trimmed = trim_separators(text);
    if trimmed.contains(char::is_whitespace) {
        return trimmed.to_string();
    }
    trim_separators(&trimmed.replace('_', " ")).to_string()
}

fn trim_separators(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.'))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '_'))
}

/// Render a stem in the rename output pattern
///
/// `CD<d>-<tt> - <title>` with a disc, `<tt> - <title>` without. Track is
/// padded to two digits.
pub fn render_stem(disc: Option<u32>, track: u32, title: &str) -> String {
    match disc {
        Some(disc) => format!("CD{}-{:02} - {}", disc, track, title),
        None => format!("{:02} - {}", track, title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(disc: Option<u32>, track: Option<u32>, title: &str) -> ParsedFilename {
        ParsedFilename {
            disc,
            track,
            title: Some(title.to_string()),
        }
    }

    #[test]
    fn track_dash_title() {
        assert_eq!(parse_stem("01 - Intro"), parsed(None, Some(1), "Intro"));
    }

    #[test]
    fn disc_track_title() {
        assert_eq!(parse_stem("CD2-05 Outro"), parsed(Some(2), Some(5), "Outro"));
        assert_eq!(
            parse_stem("Disc 1-03 - Opening Night"),
            parsed(Some(1), Some(3), "Opening Night")
        );
        assert_eq!(parse_stem("cd1.07_Finale"), parsed(Some(1), Some(7), "Finale"));
    }

    #[test]
    fn track_word_forms() {
        assert_eq!(parse_stem("Track 03 - Song"), parsed(None, Some(3), "Song"));
        assert_eq!(parse_stem("Track 3. Song"), parsed(None, Some(3), "Song"));
        assert_eq!(parse_stem("track07 Song"), parsed(None, Some(7), "Song"));
    }

    #[test]
    fn numeric_prefix_separators() {
        assert_eq!(parse_stem("3. Song"), parsed(None, Some(3), "Song"));
        assert_eq!(parse_stem("04 Song Name"), parsed(None, Some(4), "Song Name"));
        assert_eq!(parse_stem("05_Song_Name"), parsed(None, Some(5), "Song Name"));
        assert_eq!(parse_stem("06-Song"), parsed(None, Some(6), "Song"));
    }

    #[test]
    fn no_prefix_is_whole_title() {
        assert_eq!(parse_stem("Just A Song"), parsed(None, None, "Just A Song"));
        assert_eq!(parse_stem("1979"), parsed(None, None, "1979"));
        assert_eq!(
            parse_stem("2001 A Space Odyssey"),
            parsed(None, None, "2001 A Space Odyssey")
        );
    }

    #[test]
    fn zero_numbers_do_not_match() {
        assert_eq!(parse_stem("00 - Hidden"), parsed(None, None, "00 - Hidden"));
        assert_eq!(parse_stem("CD0-03 Song"), parsed(None, None, "CD0-03 Song"));
    }

    #[test]
    fn prefix_without_title_falls_back() {
        assert_eq!(parse_stem("07 - "), parsed(None, None, "07"));
        assert_eq!(parse_stem(""), ParsedFilename::default());
    }

    #[test]
    fn parse_path_strips_directory_and_extension() {
        let parsed_path = parse_path(Path::new("/music/album/CD2-05 Outro.flac"));
        assert_eq!(parsed_path, parsed(Some(2), Some(5), "Outro"));
    }

    #[test]
    fn clean_title_is_idempotent() {
        for raw in ["  - Intro - ", "_My_Song_", "a__b", "Hello World.", "..x_", "-"] {
            let once = clean_title(raw);
            assert_eq!(clean_title(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn render_then_parse_is_stable() {
        let cases = [
            (None, 1, "Intro"),
            (Some(2), 5, "Outro"),
            (None, 12, "Song Name"),
            (Some(1), 99, "Last One"),
        ];
        for (disc, track, title) in cases {
            let stem = render_stem(disc, track, title);
            let first = parse_stem(&stem);
            assert_eq!(first, parsed(disc, Some(track), title), "stem {:?}", stem);

            let title = first.title.clone().unwrap();
            let again = parse_stem(&render_stem(first.disc, track, &title));
            assert_eq!(again, first);
        }
    }

    #[test]
    fn render_pads_track() {
        assert_eq!(render_stem(None, 1, "Intro"), "01 - Intro");
        assert_eq!(render_stem(Some(1), 1, "Intro"), "CD1-01 - Intro");
        assert_eq!(render_stem(None, 123, "Long"), "123 - Long");
    }
}
