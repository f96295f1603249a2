/// Conversion request types
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Video extensions picked up by batch conversion
pub const VIDEO_EXTENSIONS: [&str; 11] = [
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp", "mpg", "mpeg",
];

/// Target MP3 bitrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Bitrate {
    #[serde(rename = "128k")]
    K128,
    #[default]
    #[serde(rename = "192k")]
    K192,
    #[serde(rename = "256k")]
    K256,
    #[serde(rename = "320k")]
    K320,
}

impl Bitrate {
    pub fn as_str(self) -> &'static str {
        match self {
            Bitrate::K128 => "128k",
            Bitrate::K192 => "192k",
            Bitrate::K256 => "256k",
            Bitrate::K320 => "320k",
        }
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bitrate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('k') {
            "128" => Ok(Bitrate::K128),
            "192" => Ok(Bitrate::K192),
            "256" => Ok(Bitrate::K256),
            "320" => Ok(Bitrate::K320),
            _ => Err(format!(
                "invalid bitrate '{}' (expected 128k, 192k, 256k or 320k)",
                s
            )),
        }
    }
}

/// What happens to source metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataMode {
    /// Drop everything, then carry over the audio-relevant source tags
    #[default]
    Clean,
    /// Copy all container metadata as ffmpeg maps it
    CopyAll,
    /// Write no metadata
    None,
}

impl FromStr for MetadataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clean" => Ok(MetadataMode::Clean),
            "copy-all" | "copy" | "all" => Ok(MetadataMode::CopyAll),
            "none" | "off" => Ok(MetadataMode::None),
            _ => Err(format!(
                "invalid metadata mode '{}' (expected clean, copy-all or none)",
                s
            )),
        }
    }
}

impl MetadataMode {
    /// Mode for a preserve-metadata flag
    pub fn from_preserve(preserve: bool) -> Self {
        if preserve {
            MetadataMode::Clean
        } else {
            MetadataMode::None
        }
    }
}

/// A single conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,

    /// Output file; `<input stem>.mp3` next to the input when unset
    pub output: Option<PathBuf>,

    pub bitrate: Bitrate,
    pub metadata: MetadataMode,
    pub overwrite: bool,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            bitrate: Bitrate::default(),
            metadata: MetadataMode::default(),
            overwrite: false,
        }
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn bitrate(mut self, bitrate: Bitrate) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn metadata(mut self, metadata: MetadataMode) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Resolved output path
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.input))
    }
}

/// `<dir>/<stem>.mp3` for an input file
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("mp3")
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Converted(PathBuf),
    /// Output existed and overwrite was off
    Skipped(PathBuf),
}

/// Batch conversion statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchStats {
    pub fn summary_text(&self) -> String {
        format!(
            "Conversion complete: {} total, {} converted, {} skipped, {} failed",
            self.total, self.converted, self.skipped, self.failed
        )
    }
}
