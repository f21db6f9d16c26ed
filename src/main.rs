use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use tracing::{error, info};

use lodgelink::config::Settings;
use lodgelink::core::Linker;
use lodgelink::dataset;
use lodgelink::models::{ClassifierMode, ResolutionPolicy};

/// Link two accommodation listing datasets into a 1:1 matched table.
#[derive(Debug, Parser)]
#[command(name = "lodgelink", version, about)]
struct Args {
    /// CSV of listings from the left-hand source
    left: PathBuf,

    /// CSV of listings from the right-hand source
    right: PathBuf,

    /// Label used to synthesize left-hand source ids
    #[arg(long, default_value = "left")]
    left_label: String,

    /// Label used to synthesize right-hand source ids
    #[arg(long, default_value = "right")]
    right_label: String,

    /// Where to write the matched table; stdout summary only if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv or json
    #[arg(long, default_value = "csv")]
    format: String,

    /// Override the configured classifier mode (threshold | probabilistic)
    #[arg(long, value_parser = ClassifierMode::from_str)]
    mode: Option<ClassifierMode>,

    /// Override the configured title threshold
    #[arg(long)]
    title_threshold: Option<f64>,

    /// Override the configured city threshold and enable city scoring
    #[arg(long)]
    city_threshold: Option<f64>,

    /// Override the configured resolution policy (greedy | exclusive-ties)
    #[arg(long, value_parser = ResolutionPolicy::from_str)]
    policy: Option<ResolutionPolicy>,
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    let mut options = settings.linkage.to_options();

    if let Some(mode) = args.mode {
        options.classifier_mode = mode;
    }
    if let Some(threshold) = args.title_threshold {
        options.title_threshold = threshold;
    }
    if let Some(threshold) = args.city_threshold {
        options.score_city = true;
        options.city_threshold = threshold;
    }
    if let Some(policy) = args.policy {
        options.resolution_policy = policy;
    }

    let left = dataset::load_listings(&args.left, &args.left_label)?;
    let right = dataset::load_listings(&args.right, &args.right_label)?;

    let linker = Linker::new(options);
    let report = linker.link(&left, &right)?;

    info!(
        matched = report.records.len(),
        unmatched_left = report.total_left - report.records.len().min(report.total_left),
        unmatched_right = report.total_right - report.records.len().min(report.total_right),
        mode = report.mode.as_str(),
        bijective = report.bijective,
        "linkage complete"
    );

    if let Some(output) = &args.output {
        match args.format.as_str() {
            "json" => dataset::write_json(output, &report)?,
            "csv" => dataset::write_csv(output, &report)?,
            other => return Err(format!("unknown output format `{other}`").into()),
        }
        info!(path = %output.display(), "wrote matched table");
    }

    Ok(())
}
