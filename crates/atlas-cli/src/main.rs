//! Main entry point for COVID Atlas.

use anyhow::{Context, Result};
use atlas_cli::AtlasRunner;
use atlas_common::init_logging;
use atlas_config::{ConfigLoader, ConfigValidator};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "covid-atlas", author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory, overriding the configuration
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Inclusive last date, `YYYY-MM-DD`
    #[arg(long)]
    max_date: Option<String>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = args.config.clone().or_else(ConfigLoader::resolve_path);
    let mut config = match &source {
        Some(path) => ConfigLoader::load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_defaults_with(|var| env::var(var).ok())
            .context("failed to load configuration")?,
    };

    if let Some(output) = args.output {
        config.output.directory = output;
    }
    if let Some(max_date) = args.max_date {
        config.filter.max_date = max_date;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    ConfigValidator::validate(&config).context("invalid command line override")?;

    let _guard = init_logging(&config.logging.to_logging_config())
        .context("failed to initialize logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting COVID Atlas");
    match &source {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!("No configuration file found, using defaults"),
    }

    let summary = AtlasRunner::new(config).run().context("atlas run failed")?;
    info!(
        rows = summary.table_rows,
        days = summary.days,
        features = summary.features,
        warnings = summary.warnings.len(),
        "Wrote {} files",
        summary.files.len()
    );
    Ok(())
}
