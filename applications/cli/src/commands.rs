//! Subcommand implementations
//!
//! Every command returns the number of per-file failures; structural
//! failures come back as errors.

use crate::cli::{Cli, Commands, ConvertArgs, ExtractArgs, UpdateArgs};
use crate::config::TagsyncConfig;
use crate::output::{ConvertView, ExtractView, PlanView, UpdateView};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tagsync_convert::{ConversionRequest, ConversionStatus, FfmpegConverter, MetadataMode};
use tagsync_core::{BulkEdit, RecordStore};
use tagsync_csv::{export_file, CsvImporter};
use tagsync_metadata::{BatchScanner, ExtractOptions, Extractor, ScanOutcome};
use tagsync_update::{plan, UpdateEngine, UpdateOptions, UpdatePlan, UpdateReport};
use tracing::{debug, info, warn};

/// Run the selected subcommand
pub async fn run<W: Write>(cli: &Cli, config: &TagsyncConfig, out: &mut W) -> Result<usize> {
    match &cli.command {
        Commands::Extract(args) => extract(args, config, cli.json, out),
        Commands::Plan(args) => show_plan(args, config, cli.json, out),
        Commands::Update(args) => update(args, config, cli.json, out),
        Commands::Convert(args) => convert(args, config, cli.json, out).await,
    }
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn scan(directory: &Path, recursive: bool) -> Result<ScanOutcome> {
    let outcome = BatchScanner::new()
        .scan(directory, recursive)
        .with_context(|| format!("Failed to scan {}", directory.display()))?;

    if outcome.files.is_empty() {
        warn!("No audio files found in {}", directory.display());
    }
    Ok(outcome)
}

/// Scan, read tags, and export the record store as CSV
pub fn extract<W: Write>(
    args: &ExtractArgs,
    config: &TagsyncConfig,
    json: bool,
    out: &mut W,
) -> Result<usize> {
    let scanned = scan(&args.directory, args.recursive || config.scan.recursive)?;

    let options = ExtractOptions {
        filename_override: args.filename_override || config.extract.filename_override,
    };
    let report = Extractor::new(options)
        .extract_all(&scanned.files)
        .context("Failed to build record store")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.csv.path_in(&args.directory));
    export_file(&report.store, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("{}", report.summary());

    if json {
        print_json(out, &ExtractView::new(&report, &output))?;
    } else {
        writeln!(out, "{}", report.summary())?;
        for issue in &report.issues {
            writeln!(out, "  {}: {}", issue.path.display(), issue.reason)?;
        }
        writeln!(out, "Metadata exported to {}", output.display())?;
    }

    Ok(0)
}

/// Record store from the CSV, with bulk edits applied
fn load_store(args: &UpdateArgs, config: &TagsyncConfig) -> Result<(RecordStore, PathBuf, usize)> {
    let scanned = scan(&args.directory, args.recursive || config.scan.recursive)?;
    let csv_path = args
        .csv
        .clone()
        .unwrap_or_else(|| config.csv.path_in(&args.directory));

    let mut store = CsvImporter::new(&args.directory)
        .with_library(&scanned.files)
        .import_file(&csv_path)
        .with_context(|| format!("Failed to import {}", csv_path.display()))?;

    let edited = apply_edits(&mut store, args)?;
    Ok((store, csv_path, edited))
}

fn apply_edits(store: &mut RecordStore, args: &UpdateArgs) -> Result<usize> {
    let targets = if args.only.is_empty() {
        None
    } else {
        let paths: Vec<PathBuf> = store
            .iter()
            .filter(|record| {
                record
                    .file_name()
                    .is_some_and(|name| args.only.iter().any(|only| only == name))
            })
            .map(|record| record.path().to_path_buf())
            .collect();
        if paths.is_empty() {
            bail!("None of the --only files are in the CSV");
        }
        Some(paths)
    };

    let edits = args
        .set
        .iter()
        .map(|(field, value)| BulkEdit::set(*field, value.clone()))
        .chain(args.clear.iter().map(|field| BulkEdit::clear(*field)));

    let mut edited = 0;
    for mut edit in edits {
        edit.targets = targets.clone();
        let count = store
            .apply_edit(&edit)
            .with_context(|| format!("Invalid value for {}", edit.field))?;
        debug!("Set {} on {} record(s)", edit.field, count);
        edited += count;
    }
    Ok(edited)
}

fn update_options(args: &UpdateArgs, config: &TagsyncConfig) -> UpdateOptions {
    UpdateOptions {
        rename: args.rename || config.update.rename,
        overwrite: args.overwrite || config.update.overwrite,
        dry_run: args.dry_run || config.update.dry_run,
    }
}

fn write_plan<W: Write>(plan: &UpdatePlan, out: &mut W) -> Result<()> {
    for file in &plan.files {
        match (&file.collision, file.new_path.as_ref().filter(|_| file.will_rename)) {
            (Some(collision), _) => {
                writeln!(out, "SKIP {}: {}", file.path.display(), collision)?;
                continue;
            }
            (None, Some(target)) => {
                writeln!(out, "{} -> {}", file.path.display(), target.display())?;
            }
            (None, None) => writeln!(out, "{}", file.path.display())?,
        }

        let fields: Vec<String> = file
            .write_set
            .present_fields()
            .iter()
            .map(ToString::to_string)
            .collect();
        if !fields.is_empty() {
            writeln!(out, "  write: {}", fields.join(", "))?;
        }
    }
    writeln!(
        out,
        "{} file(s), {} collision(s)",
        plan.len(),
        plan.collisions().count()
    )?;
    Ok(())
}

/// Print the update plan; collisions count as failures
pub fn show_plan<W: Write>(
    args: &UpdateArgs,
    config: &TagsyncConfig,
    json: bool,
    out: &mut W,
) -> Result<usize> {
    let (store, _, _) = load_store(args, config)?;
    let plan = plan(&store, update_options(args, config));

    if json {
        print_json(out, &PlanView::from(&plan))?;
    } else {
        write_plan(&plan, out)?;
    }
    Ok(plan.collisions().count())
}

/// Write the CSV back onto the files
///
/// After a real run that renamed or edited anything, the CSV is re-exported
/// so its filenames and values match the disk.
pub fn update<W: Write>(
    args: &UpdateArgs,
    config: &TagsyncConfig,
    json: bool,
    out: &mut W,
) -> Result<usize> {
    let (mut store, csv_path, edited) = load_store(args, config)?;
    let options = update_options(args, config);
    let plan = plan(&store, options);
    let engine = UpdateEngine::new();

    let mut outcomes = Vec::with_capacity(plan.len());
    for outcome in engine.outcomes(&plan, options.dry_run) {
        if !json {
            writeln!(out, "{}", outcome)?;
        }
        outcomes.push(outcome);
    }
    let report = UpdateReport {
        outcomes,
        dry_run: options.dry_run,
    };
    info!("{}", report.summary_text());

    report
        .refresh_store(&mut store)
        .context("Failed to refresh record store")?;
    if !options.dry_run && (report.renamed() > 0 || edited > 0) {
        export_file(&store, &csv_path)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        info!("Updated {}", csv_path.display());
    }

    if json {
        print_json(out, &UpdateView::from(&report))?;
    } else {
        writeln!(out, "{}", report.summary_text())?;
    }
    Ok(report.failed())
}

fn metadata_mode(args: &ConvertArgs, config: &TagsyncConfig) -> MetadataMode {
    if args.no_metadata {
        MetadataMode::None
    } else if args.keep_video_metadata {
        MetadataMode::CopyAll
    } else {
        MetadataMode::from_preserve(config.convert.preserve_metadata)
    }
}

/// Convert one video file, or every video file in a folder
pub async fn convert<W: Write>(
    args: &ConvertArgs,
    config: &TagsyncConfig,
    json: bool,
    out: &mut W,
) -> Result<usize> {
    let ffmpeg_path = args
        .ffmpeg
        .clone()
        .unwrap_or_else(|| config.convert.ffmpeg_path.clone());
    let converter = FfmpegConverter::new(&ffmpeg_path);
    if !converter.available().await {
        bail!(
            "FFmpeg not found at {} (install it or set convert.ffmpeg_path)",
            ffmpeg_path.display()
        );
    }

    let template = ConversionRequest::new(&args.input)
        .bitrate(args.quality.unwrap_or(config.convert.bitrate))
        .metadata(metadata_mode(args, config))
        .overwrite(args.overwrite || config.convert.overwrite);

    if args.input.is_dir() {
        let stats = converter
            .batch_convert(
                &args.input,
                args.output.as_deref(),
                args.recursive,
                &template,
            )
            .await
            .with_context(|| format!("Failed to convert {}", args.input.display()))?;

        if json {
            print_json(out, &ConvertView::Batch(&stats))?;
        } else {
            for (path, reason) in &stats.failures {
                writeln!(out, "FAILED {}: {}", path.display(), reason)?;
            }
            writeln!(out, "{}", stats.summary_text())?;
        }
        return Ok(stats.failed);
    }

    let request = match &args.output {
        Some(output) => template.output(output),
        None => template,
    };
    let timeout = Duration::from_secs(config.convert.timeout_secs);
    let status = tokio::time::timeout(timeout, converter.convert(&request))
        .await
        .with_context(|| {
            format!(
                "Conversion of {} timed out after {}s",
                request.input.display(),
                timeout.as_secs()
            )
        })?
        .with_context(|| format!("Failed to convert {}", request.input.display()))?;

    if json {
        print_json(out, &ConvertView::from(status))?;
    } else {
        match status {
            ConversionStatus::Converted(output) => {
                writeln!(out, "Converted {}", output.display())?;
            }
            ConversionStatus::Skipped(output) => {
                writeln!(out, "Skipped {} (exists, use --overwrite)", output.display())?;
            }
        }
    }
    Ok(0)
}
