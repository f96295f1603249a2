//! Tagsync Convert
//!
//! Video to MP3 conversion through an external `ffmpeg` binary.
//!
//! Source metadata is read with `ffprobe` and, in the default clean mode,
//! only the audio-relevant fields are carried into the MP3.
//!
//! # Example
//!
//! ```rust,no_run
//! use tagsync_convert::{Bitrate, ConversionRequest, FfmpegConverter};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = FfmpegConverter::new("ffmpeg");
//! let request = ConversionRequest::new("/videos/live.mp4").bitrate(Bitrate::K320);
//! let status = converter.convert(&request).await?;
//! println!("{:?}", status);
//! # Ok(())
//! # }
//! ```

mod error;
mod ffmpeg;
mod request;

pub use error::{ConvertError, Result};
pub use ffmpeg::{build_args, carried_metadata, tags_from_probe, FfmpegConverter};
pub use request::{
    default_output, BatchStats, Bitrate, ConversionRequest, ConversionStatus, MetadataMode,
    VIDEO_EXTENSIONS,
};
