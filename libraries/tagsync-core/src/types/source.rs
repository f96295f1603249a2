//! Provenance of the values held by a record

use super::field::{Field, FieldGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the current value of a field group came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    /// Embedded tag in the audio file
    #[default]
    Tag,
    /// Parsed from the filename
    Filename,
    /// Edited by hand (bulk edit or tabular import)
    Manual,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Tag => "TAG",
            Source::Filename => "FILENAME",
            Source::Manual => "MANUAL",
        })
    }
}

/// Per-group provenance of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    /// Source of the title
    pub title: Source,
    /// Source of track and disc numbers
    pub numbering: Source,
    /// Source of artist, album, album artist, genre and year
    pub descriptive: Source,
}

impl Provenance {
    /// Same source for every group
    pub fn uniform(source: Source) -> Self {
        Self {
            title: source,
            numbering: source,
            descriptive: source,
        }
    }

    /// Source of a group
    pub fn of(&self, group: FieldGroup) -> Source {
        match group {
            FieldGroup::Title => self.title,
            FieldGroup::Numbering => self.numbering,
            FieldGroup::Descriptive => self.descriptive,
        }
    }

    /// Set the source of a group
    pub fn set(&mut self, group: FieldGroup, source: Source) {
        match group {
            FieldGroup::Title => self.title = source,
            FieldGroup::Numbering => self.numbering = source,
            FieldGroup::Descriptive => self.descriptive = source,
        }
    }

    /// Set the source of every group touched by `fields`
    pub fn mark(&mut self, fields: &[Field], source: Source) {
        for field in fields {
            self.set(field.group(), source);
        }
    }
}
