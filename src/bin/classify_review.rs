//! Classify a single review and print the result as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use review_sentiment::logging::init_logging;
use review_sentiment::{EvalConfig, SentimentClassifier};

#[derive(Debug, Parser)]
#[command(name = "classify_review", version, about = "Classify one movie review")]
struct Cli {
    /// Review text; words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Exit with a non-zero status when the classifier fell back to its default
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("warn");
    let cli = Cli::parse();
    let text = cli.text.join(" ");

    let config = EvalConfig::from_env().context("loading configuration")?;
    let classifier = SentimentClassifier::from_config(&config).context("building classifier")?;

    let verdict = classifier.evaluate(&text).await;
    let fallback = verdict.is_fallback();
    let result = verdict.into_result();

    println!("{}", serde_json::to_string_pretty(&result)?);
    if cli.strict && fallback {
        bail!("classification fell back to the default result");
    }
    Ok(())
}
