//! Score a predictions CSV against its true labels.

use anyhow::{Context, Result};
use clap::Parser;
use review_sentiment::dataset::load_results;
use review_sentiment::logging::init_logging;
use review_sentiment::metrics::compute;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "analyze_results", version, about = "Evaluation metrics for classified reviews")]
struct Cli {
    /// Predictions CSV written by batch_eval; needs a true_sentiment column
    #[arg(short, long, value_name = "FILE", default_value = "results.csv")]
    results: PathBuf,
}

fn main() -> Result<()> {
    init_logging("warn");
    let cli = Cli::parse();

    let records = load_results(&cli.results)
        .with_context(|| format!("reading results from {}", cli.results.display()))?;
    let report = compute(&records).context("computing metrics")?;

    print!("{}", report);
    Ok(())
}
