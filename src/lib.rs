//! # review-sentiment: LLM-oracle sentiment classification for movie reviews
//!
//! Classifies free-text movie reviews as Positive, Negative or Neutral by
//! prompting a large language model, validates every answer against a fixed
//! schema, runs labeled datasets through the classifier in paced batches and
//! scores the predictions against ground truth.
//!
//! ## Key Features
//!
//! - Few-shot prompt with a strict JSON response schema
//! - Classification never fails: bad input, bad output and oracle outages
//!   collapse into a Neutral default with an explanation
//! - Batch runs isolate per-review failures and keep input order
//! - Accuracy, per-class precision/recall/F1, confusion matrix and
//!   confidence statistics
//! - Secure API key handling with memory zeroing
//!
//! ## Basic Usage
//!
//! ```no_run
//! use review_sentiment::from_env;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let classifier = from_env()?;
//!
//!     let result = classifier
//!         .classify("A gorgeous, heartfelt film with a career-best performance.")
//!         .await;
//!
//!     println!("{} ({:.2}): {}", result.label, result.confidence, result.explanation);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod client;
pub mod builder;
pub mod utils;
pub mod sentiment;
pub mod batch;
pub mod aggregate;
pub mod metrics;
pub mod dataset;
pub mod config;
pub mod logging;
pub mod session;

// Re-export core components
pub use client::{Oracle, OracleClient, SamplingConfig};
pub use types::{ClaudeModel, EvalError, EvalResult, SecureApiKey, sanitize_error_message};
pub use builder::MessageBuilder;
pub use config::EvalConfig;
pub use sentiment::{ClassificationResult, FallbackReason, Sentiment, SentimentClassifier, Verdict};
pub use batch::{BatchItemOutcome, BatchRunner, BatchSummary, ItemStatus, PredictedLabel, Prediction, ReviewClassifier};
pub use aggregate::{merge, OutputRecord, OutputRecordSet};
pub use metrics::{compute, MetricsReport};
pub use dataset::{Review, ReviewDataset};
pub use session::{AnalysisSession, SessionSummary};

pub mod prelude {
    //! Convenient imports for commonly used types and functions
    pub use crate::{
        from_env, AnalysisSession, BatchRunner, ClassificationResult, EvalConfig, EvalError,
        EvalResult, MetricsReport, Oracle, OutputRecordSet, PredictedLabel, Review,
        ReviewClassifier, Sentiment, SentimentClassifier,
    };
    pub use crate::dataset::{load_results, load_reviews, save_output};
}

/// Build a classifier from the environment (and `.env`, if present)
pub fn from_env() -> EvalResult<SentimentClassifier> {
    let config = EvalConfig::from_env()?;
    SentimentClassifier::from_config(&config)
}
