//! Classify every review in a CSV file and write the predictions next to the
//! input columns.

use anyhow::{Context, Result};
use clap::Parser;
use review_sentiment::batch::{BatchRunner, BatchSummary};
use review_sentiment::dataset::{load_reviews, save_output};
use review_sentiment::logging::init_logging;
use review_sentiment::{merge, EvalConfig, SentimentClassifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "batch_eval", version, about = "Batch sentiment classification of movie reviews")]
struct Cli {
    /// Input CSV with a review_text column
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the predictions CSV
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Pause between requests in milliseconds (overrides SENTIMENT_REQUEST_DELAY_MS)
    #[arg(long)]
    delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let mut config = EvalConfig::from_env().context("loading configuration")?;
    if let Some(ms) = cli.delay_ms {
        config = config.with_request_delay(Duration::from_millis(ms));
    }

    let dataset = load_reviews(&cli.input)
        .with_context(|| format!("reading reviews from {}", cli.input.display()))?;
    if dataset.is_empty() {
        warn!(path = %cli.input.display(), "input file has no reviews");
    }
    info!(reviews = dataset.len(), model = %config.model, "starting batch run");

    let classifier = SentimentClassifier::from_config(&config).context("building classifier")?;
    let runner = BatchRunner::new(Arc::new(classifier)).with_delay(config.request_delay);
    let outcomes = runner.run(&dataset.reviews).await;
    let summary = BatchSummary::from_outcomes(&outcomes);

    let records = merge(dataset.columns, &dataset.reviews, outcomes)?;
    save_output(&records, &cli.output)
        .with_context(|| format!("writing results to {}", cli.output.display()))?;

    info!("{}", summary);
    info!(path = %cli.output.display(), "results saved");
    Ok(())
}
