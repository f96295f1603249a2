/// Command-line interface
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tagsync_convert::Bitrate;
use tagsync_core::Field;

#[derive(Debug, Parser)]
#[command(name = "tagsync")]
#[command(about = "Extract, edit and write back music tags through a CSV file", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read tags (with filename fallback) and export them as CSV
    Extract(ExtractArgs),
    /// Show what an update would change, without touching any file
    Plan(UpdateArgs),
    /// Write tags from a CSV back to the files, optionally renaming them
    Update(UpdateArgs),
    /// Convert video files to MP3 with FFmpeg
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Directory containing music files
    pub directory: PathBuf,

    /// Output CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Search subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Let values parsed from filenames replace tag values
    #[arg(long)]
    pub filename_override: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Directory containing music files
    pub directory: PathBuf,

    /// CSV file to read
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Search subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Rename files to `[CD<d>-]<tt> - <title>`
    #[arg(long)]
    pub rename: bool,

    /// Replace existing rename destinations
    #[arg(long)]
    pub overwrite: bool,

    /// Report what would happen without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Set a field on every record (or on --only files), e.g. `--set album="Live"`
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(Field, String)>,

    /// Clear a field in the record set (tags already on disk are left alone)
    #[arg(long = "clear", value_name = "FIELD", value_parser = parse_field)]
    pub clear: Vec<Field>,

    /// Restrict --set/--clear to these file names
    #[arg(long = "only", value_name = "FILENAME")]
    pub only: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input video file or folder
    pub input: PathBuf,

    /// Output file or folder
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// MP3 bitrate (128k, 192k, 256k, 320k)
    #[arg(short, long)]
    pub quality: Option<Bitrate>,

    /// Search subdirectories when the input is a folder
    #[arg(short, long)]
    pub recursive: bool,

    /// Strip all metadata
    #[arg(long, conflicts_with = "keep_video_metadata")]
    pub no_metadata: bool,

    /// Copy all container metadata instead of only audio fields
    #[arg(long)]
    pub keep_video_metadata: bool,

    /// Replace existing MP3 files
    #[arg(long)]
    pub overwrite: bool,

    /// FFmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,
}

fn parse_field(s: &str) -> Result<Field, String> {
    Field::from_column(s.trim()).ok_or_else(|| {
        let known: Vec<&str> = Field::ALL.iter().map(|f| f.column()).collect();
        format!("unknown field '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn parse_assignment(s: &str) -> Result<(Field, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    Ok((parse_field(field)?, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        assert_eq!(
            parse_assignment("album=Live at Home").unwrap(),
            (Field::Album, "Live at Home".to_string())
        );
        assert_eq!(
            parse_assignment("year=").unwrap(),
            (Field::Year, String::new())
        );
        assert!(parse_assignment("album").is_err());
        assert!(parse_assignment("mood=calm").is_err());
    }

    #[test]
    fn parses_update_command() {
        let cli = Cli::try_parse_from([
            "tagsync",
            "update",
            "/music",
            "--rename",
            "-n",
            "--set",
            "artist=The Band",
            "--clear",
            "genre",
            "--only",
            "01 - Intro.mp3",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert!(args.rename && args.dry_run && !args.overwrite);
        assert_eq!(args.set, vec![(Field::Artist, "The Band".to_string())]);
        assert_eq!(args.clear, vec![Field::Genre]);
        assert_eq!(args.only, vec!["01 - Intro.mp3".to_string()]);
    }

    #[test]
    fn convert_metadata_flags_conflict() {
        assert!(Cli::try_parse_from([
            "tagsync",
            "convert",
            "clip.mp4",
            "--no-metadata",
            "--keep-video-metadata",
        ])
        .is_err());

        let cli = Cli::try_parse_from(["tagsync", "convert", "clip.mp4", "-q", "320k"]).unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.quality, Some(Bitrate::K320));
    }
}
