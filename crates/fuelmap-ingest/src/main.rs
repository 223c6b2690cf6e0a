//! Fuelmap Ingest - fuel-price pipeline runner

use anyhow::Result;
use clap::Parser;
use fuelmap_common::logging::{init_logging, LogConfig, LogLevel};
use fuelmap_ingest::config::{PipelineConfig, PublishConfig, DEFAULT_CLASSES};
use fuelmap_ingest::pipeline::{self, RunOutcome};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fuelmap-ingest")]
#[command(author, version, about = "Fuel-price ingestion and tileset pipeline")]
struct Cli {
    /// Output directory for run artifacts
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Upstream URL override
    #[arg(long)]
    url: Option<String>,

    /// Number of quantile classes for the break statistics
    #[arg(long, default_value_t = DEFAULT_CLASSES)]
    classes: usize,

    /// Skip publishing even when a publish target is configured
    #[arg(long)]
    skip_publish: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Publish credentials may come from a local .env file.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging from the environment; the verbose flag wins.
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let mut config = PipelineConfig::new(&cli.data_dir);
    if let Some(url) = cli.url {
        config.fetch.url = url;
    }
    config.classes = cli.classes;
    if !cli.skip_publish {
        config.publish = PublishConfig::from_env()?;
    }

    match pipeline::run(&config).await? {
        RunOutcome::Completed => info!("pipeline run complete"),
        RunOutcome::NoData => info!("upstream had no data this cycle; nothing produced"),
        RunOutcome::NoGeometry => info!("no mappable rows this cycle; tiles not rebuilt"),
    }

    Ok(())
}
