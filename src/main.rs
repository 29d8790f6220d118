use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

mod classification;
mod config;
mod ingest;
mod indicators;
mod report;
mod output;
mod error;

use crate::config::Config;
use crate::error::ReportResult;
use crate::output::{OutputFormat, ReportStem};

#[derive(Parser)]
#[command(name = "bodycomp_report")]
#[command(about = "Single-page progress report from a body-composition visit log")]
struct Cli {
    /// Visit log (delimited text, one row per visit)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file path (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Artifacts to write; repeat or comma-separate (default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    format: Vec<OutputFormat>,

    /// Seed for the report file name, for reproducible output paths
    #[arg(short, long)]
    seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ReportResult<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => {
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    let include_body_water = config.report.include_body_water;
    let series = ingest::load_visits(&cli.input, &config.ingest, include_body_water)?;
    if series.len() < 2 {
        warn!("Visit log {:?} has {} visit(s); a report needs at least 2", cli.input, series.len());
    }

    let rows = indicators::evaluate(&series, &config.tables, include_body_water)?;
    info!("Evaluated {} indicators over {} visits", rows.len(), series.len());

    let report = report::build_report(&series, rows, &config.report)?;

    std::fs::create_dir_all(&cli.output)?;

    let formats = if cli.format.is_empty() {
        OutputFormat::all()
    } else {
        cli.format.clone()
    };
    let stem = ReportStem::generate(report.subject.latest_visit, cli.seed);
    let written = output::save_report(&report, &cli.output, &stem, &formats)?;
    info!("Report {} saved ({} file(s)) to {:?}", stem.as_str(), written.len(), cli.output);

    Ok(())
}
