//! Daystamp command line front end
//!
//! Annotates a JSON array of records and prints the annotated records as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Timestamps from file paths, with day phases for Berlin
//! cargo run --bin daystamp -- annotate --input records.json --source filepath \
//!     --geo 52.52,13.405
//!
//! # Timestamps from creation times, skipping nothing, writing to a file
//! cargo run --bin daystamp -- annotate --input records.json --source createdAt \
//!     --timezone America/New_York --output annotated.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `DAYSTAMP_CONFIG`: Configuration file, same as `--config`

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use daystamp_rust::{
    AnnotateConfig, AnnotateParams, AnnotationError, BatchAnnotator, FailurePolicy,
    MemoryCollection, WriteStrategy,
};

/// Exit status for configuration errors; nothing was written.
const EXIT_CONFIGURATION: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "daystamp",
    version,
    about = "Timestamp and day-phase annotation for media records"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Annotate records with datetime, weekday, time and optional day phase
    Annotate(AnnotateArgs),
}

#[derive(Debug, clap::Args)]
struct AnnotateArgs {
    /// JSON array of records (`filepath`, optional `local_path` and `created_at`)
    #[arg(short, long)]
    input: PathBuf,

    /// Timestamp source: `filepath` or `createdAt`
    #[arg(short, long, default_value = "filepath")]
    source: String,

    /// Six-group filepath pattern; defaults to the configured pattern
    #[arg(short, long)]
    pattern: Option<String>,

    /// Coordinates as `latitude,longitude`; enables the `timeofday` field
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    geo: Option<Vec<f64>>,

    /// IANA timezone for naive timestamps; defaults to the configured timezone
    #[arg(short, long)]
    timezone: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "DAYSTAMP_CONFIG")]
    config: Option<PathBuf>,

    /// Leave unparsable records unannotated instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Write one value at a time instead of whole columns
    #[arg(long)]
    per_record: bool,

    /// Output file; defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Annotate(args) => annotate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let configuration = err
                .downcast_ref::<AnnotationError>()
                .is_some_and(AnnotationError::is_configuration);
            error!("{:#}", err);
            if configuration {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn load_config(args: &AnnotateArgs) -> Result<AnnotateConfig, AnnotationError> {
    let mut config = match &args.config {
        Some(path) => AnnotateConfig::from_file(path)?,
        None => AnnotateConfig::from_default_location()?,
    };

    if args.skip_invalid {
        config.failure_policy = FailurePolicy::Skip;
    }
    if args.per_record {
        config.write_strategy = WriteStrategy::PerRecord;
    }
    Ok(config)
}

fn annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let mut collection = MemoryCollection::from_json_str(&json)
        .with_context(|| format!("Failed to parse records from {}", args.input.display()))?;

    let mut params = AnnotateParams::new(&args.source);
    params.pattern = args
        .pattern
        .clone()
        .or_else(|| (args.source == "filepath").then(|| config.pattern.clone()));
    params.geo = args.geo.clone();
    params.timezone = args.timezone.clone();

    let report = BatchAnnotator::new(config).run(&mut collection, &params)?;
    info!(
        "Annotated {}/{} records ({} skipped), fields: {}",
        report.annotated,
        report.total,
        report.skipped.len(),
        report.fields.join(", ")
    );

    let output = collection
        .to_json_pretty()
        .context("Failed to serialize annotated records")?;
    match &args.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", output),
    }

    Ok(())
}
