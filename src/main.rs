//! `roi-calc`: run the ROI engine on a JSON profile and print the report.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use neuroexpert_roi::pricing::responses::EngineErrorResponse;
use neuroexpert_roi::pricing::CalculateRoiRequest;
use neuroexpert_roi::{EngineConfig, RoiEngine};

#[derive(Debug, Parser)]
#[command(name = "roi-calc", about = "Calculate ROI, pricing and payback for a business profile")]
struct Cli {
    /// JSON profile to read (stdin when omitted)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Monte Carlo trials, overrides ROI_ITERATIONS
    #[arg(long)]
    iterations: Option<usize>,

    /// Discount rate for NPV, e.g. 0.1
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Seed for a reproducible simulation, overrides ROI_SEED
    #[arg(long)]
    seed: Option<u64>,

    /// Artificial delay before calculating, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("neuroexpert_roi=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading profile from {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading profile from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env().context("loading engine configuration")?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    let engine = RoiEngine::from_config(config).context("initialising engine")?;

    let input = read_input(cli.profile.as_ref())?;
    let outcome = run(&engine, &input, &cli).await;

    match outcome {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Calculation failed: {}", err);
            let body = serde_json::to_string(&EngineErrorResponse::from(&err))?;
            println!("{}", body);
            std::process::exit(2);
        }
    }
}

async fn run(
    engine: &RoiEngine,
    input: &str,
    cli: &Cli,
) -> neuroexpert_roi::Result<String> {
    let (profile, mut overrides) = CalculateRoiRequest::from_json(input)?.into_parts()?;
    if let Some(iterations) = cli.iterations {
        overrides.iterations = Some(iterations);
    }
    if let Some(rate) = cli.discount_rate {
        overrides.discount_rate = Some(Decimal::from_f64(rate).ok_or_else(|| {
            neuroexpert_roi::EngineError::invalid_input("discount_rate", "must be finite")
        })?);
    }

    let result = engine
        .calculate_with_delay(&profile, &overrides, Duration::from_millis(cli.delay_ms))
        .await?;
    let report = engine.report(&profile, result);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
