/// Tagsync - music tag extraction and bulk update
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tagsync_cli::{cli::Cli, commands, config::TagsyncConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "tagsync=info,tagsync_cli=info,tagsync_metadata=info,\
tagsync_csv=info,tagsync_update=info,tagsync_convert=info";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        DEFAULT_FILTER.replace("=info", "=debug")
    } else {
        DEFAULT_FILTER.to_string()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TagsyncConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let failures = commands::run(&cli, &config, &mut out).await?;
    out.flush()?;

    if failures > 0 {
        tracing::warn!("{} file(s) failed", failures);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
