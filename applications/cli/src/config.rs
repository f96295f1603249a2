/// Tagsync configuration
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagsync_convert::Bitrate;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tagsync.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagsyncConfig {
    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub extract: ExtractSettings,

    #[serde(default)]
    pub update: UpdateSettings,

    #[serde(default)]
    pub convert: ConvertSettings,

    #[serde(default)]
    pub csv: CsvSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanSettings {
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExtractSettings {
    /// Filename-derived values replace tag values
    #[serde(default)]
    pub filename_override: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateSettings {
    #[serde(default)]
    pub rename: bool,

    #[serde(default)]
    pub overwrite: bool,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvertSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default)]
    pub bitrate: Bitrate,

    #[serde(default = "default_preserve_metadata")]
    pub preserve_metadata: bool,

    #[serde(default)]
    pub overwrite: bool,

    /// Upper bound for a single-file conversion
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvSettings {
    /// CSV file; relative paths are taken from the music directory
    #[serde(default = "default_csv_output")]
    pub output: PathBuf,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            bitrate: Bitrate::default(),
            preserve_metadata: default_preserve_metadata(),
            overwrite: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            output: default_csv_output(),
        }
    }
}

impl CsvSettings {
    /// CSV location for a music directory
    pub fn path_in(&self, music_dir: &Path) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            music_dir.join(&self.output)
        }
    }
}

impl TagsyncConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `tagsync.toml` is used when
    /// present. `TAGSYNC_<SECTION>__<KEY>` variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with TAGSYNC_)
        settings = settings.add_source(
            config::Environment::with_prefix("TAGSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.convert.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "convert.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.convert.ffmpeg_path.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "convert.ffmpeg_path must not be empty (set TAGSYNC_CONVERT__FFMPEG_PATH)"
                    .to_string(),
            ));
        }

        if self.csv.output.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "csv.output must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_preserve_metadata() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_csv_output() -> PathBuf {
    PathBuf::from("music_tags.csv")
}
