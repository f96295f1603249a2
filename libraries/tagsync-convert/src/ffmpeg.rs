/// FFmpeg wrapper for video to MP3 conversion
use crate::error::{ConvertError, Result};
use crate::request::{
    default_output, BatchStats, ConversionRequest, ConversionStatus, MetadataMode,
    VIDEO_EXTENSIONS,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tagsync_core::TagFields;
use tagsync_metadata::{normalize_year, parse_numerator, BatchScanner};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Container tags that never describe the audio
const EXCLUDED_TAGS: [&str; 16] = [
    "major_brand",
    "minor_version",
    "compatible_brands",
    "encoder",
    "encoder_settings",
    "encodersettings",
    "creation_time",
    "location",
    "location-eng",
    "com.android.version",
    "handler_name",
    "vendor_id",
    "timecode",
    "rotate",
    "duration",
    "fps",
];

#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FfmpegConverter {
    /// Create a converter; ffprobe is looked up next to ffmpeg
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = match ffmpeg_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("ffprobe"),
            _ => PathBuf::from("ffprobe"),
        };
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    /// Override the ffprobe location
    pub fn with_ffprobe(mut self, ffprobe_path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = ffprobe_path.into();
        self
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Check that `ffmpeg -version` runs and succeeds
    pub async fn available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Read the source container's format tags with ffprobe
    pub async fn probe_tags(&self, input: &Path) -> Result<TagFields> {
        let output = Command::new(&self.ffprobe_path)
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Probe(stderr.trim().to_string()));
        }

        let probe_data: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ConvertError::Probe(format!("Failed to parse FFprobe output: {}", e)))?;

        Ok(tags_from_probe(&probe_data))
    }

    /// Convert one file
    ///
    /// An existing output is left alone unless `overwrite` is set.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionStatus> {
        if !request.input.is_file() {
            return Err(ConvertError::InputNotFound(request.input.clone()));
        }

        let output = request.output_path();
        if output.exists() && !request.overwrite {
            debug!("Skipping {:?}: {:?} exists", request.input, output);
            return Ok(ConversionStatus::Skipped(output));
        }

        let carried = if request.metadata == MetadataMode::Clean {
            match self.probe_tags(&request.input).await {
                Ok(tags) => carried_metadata(&tags),
                Err(e) => {
                    warn!("No source metadata for {:?}: {}", request.input, e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let args = build_args(request, &carried, &output);
        debug!("Running {:?} {:?}", self.ffmpeg_path, args);

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ConvertError::FfmpegNotFound(self.ffmpeg_path.display().to_string())
                }
                _ => ConvertError::Io(e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConvertError::Failed {
                code: result.status.code(),
                stderr: last_line(&stderr),
            });
        }

        info!("Converted {:?} -> {:?}", request.input, output);
        Ok(ConversionStatus::Converted(output))
    }

    /// Convert every video file under `input_dir`
    ///
    /// Outputs mirror the input tree under `output_dir`, or sit next to their
    /// inputs. `template` supplies bitrate, metadata mode and overwrite.
    pub async fn batch_convert(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        recursive: bool,
        template: &ConversionRequest,
    ) -> Result<BatchStats> {
        let scan = BatchScanner::new()
            .with_extensions(VIDEO_EXTENSIONS)
            .scan(input_dir, recursive)?;
        if scan.files.is_empty() {
            return Err(ConvertError::NoInputs(input_dir.to_path_buf()));
        }

        let mut stats = BatchStats {
            total: scan.files.len(),
            ..Default::default()
        };

        for input in scan.files {
            let output = match output_dir {
                Some(dir) => {
                    let relative = input.strip_prefix(input_dir).unwrap_or(&input);
                    let target = dir.join(default_output(relative));
                    if let Some(parent) = target.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    target
                }
                None => default_output(&input),
            };

            let request = ConversionRequest {
                input: input.clone(),
                output: Some(output),
                ..template.clone()
            };

            match self.convert(&request).await {
                Ok(ConversionStatus::Converted(_)) => stats.converted += 1,
                Ok(ConversionStatus::Skipped(_)) => stats.skipped += 1,
                Err(e) => {
                    warn!("Failed to convert {:?}: {}", input, e);
                    stats.failed += 1;
                    stats.failures.push((input, e.to_string()));
                }
            }
        }

        info!("{}", stats.summary_text());
        Ok(stats)
    }
}

/// Map ffprobe's `format.tags` onto normalized fields (keys case-insensitive)
pub fn tags_from_probe(probe_data: &serde_json::Value) -> TagFields {
    let mut fields = TagFields::new();
    let Some(tags) = probe_data
        .get("format")
        .and_then(|f| f.get("tags"))
        .and_then(|t| t.as_object())
    else {
        return fields;
    };

    for (key, value) in tags {
        let key = key.to_lowercase();
        if EXCLUDED_TAGS.contains(&key.as_str()) {
            continue;
        }
        let Some(value) = value.as_str().map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };

        match key.as_str() {
            "title" => fields.title = Some(value.to_string()),
            "artist" => fields.artist = Some(value.to_string()),
            "performer" => {
                fields.artist.get_or_insert_with(|| value.to_string());
            }
            "album" => fields.album = Some(value.to_string()),
            "album_artist" | "albumartist" => fields.album_artist = Some(value.to_string()),
            "genre" => fields.genre = Some(value.to_string()),
            "date" | "year" => fields.year = Some(normalize_year(value)),
            "track" => fields.track_number = parse_numerator(value),
            "disc" => fields.disc_number = parse_numerator(value),
            _ => {}
        }
    }

    fields
}

/// ffmpeg `-metadata` pairs for the fields to carry into the MP3
pub fn carried_metadata(tags: &TagFields) -> Vec<(String, String)> {
    let pairs = [
        ("title", tags.title.clone()),
        ("artist", tags.artist.clone()),
        ("album", tags.album.clone()),
        ("album_artist", tags.album_artist.clone()),
        ("genre", tags.genre.clone()),
        ("date", tags.year.clone()),
        ("track", tags.track_number.map(|n| n.to_string())),
        ("disc", tags.disc_number.map(|n| n.to_string())),
    ];

    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

/// Build the ffmpeg argument list
pub fn build_args(
    request: &ConversionRequest,
    carried: &[(String, String)],
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), request.input.clone().into_os_string()];

    // -n never overwrites, so a race with another writer fails instead
    args.push(if request.overwrite { "-y" } else { "-n" }.into());

    for arg in [
        "-vn",
        "-acodec",
        "libmp3lame",
        "-ab",
        request.bitrate.as_str(),
        "-ar",
        "44100",
        "-ac",
        "2",
    ] {
        args.push(arg.into());
    }

    match request.metadata {
        MetadataMode::Clean => {
            args.push("-map_metadata".into());
            args.push("-1".into());
            for (key, value) in carried {
                args.push("-metadata".into());
                args.push(format!("{}={}", key, value).into());
            }
            push_bitexact(&mut args);
        }
        MetadataMode::CopyAll => {
            args.push("-map_metadata".into());
            args.push("0".into());
        }
        MetadataMode::None => {
            args.push("-map_metadata".into());
            args.push("-1".into());
            push_bitexact(&mut args);
        }
    }

    args.push(output.as_os_str().to_owned());
    args
}

fn push_bitexact(args: &mut Vec<OsString>) {
    for arg in ["-fflags", "+bitexact", "-flags:a", "+bitexact"] {
        args.push(arg.into());
    }
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no error output")
        .to_string()
}
