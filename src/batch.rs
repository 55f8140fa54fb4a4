//! Sequential, rate-limited batch classification.
//!
//! [`BatchRunner::run`] classifies one review at a time and sleeps a fixed
//! delay between consecutive oracle calls, never before the first. A failure
//! or panic while classifying one review is recorded on that review's
//! [`BatchItemOutcome`] and the batch moves on, so the output always has one
//! outcome per input in input order.

use crate::dataset::Review;
use crate::sentiment::{ClassificationResult, Sentiment};
use crate::types::*;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default pause between consecutive oracle calls
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Anything that can classify a single review for the batch runner
#[async_trait]
pub trait ReviewClassifier: Send + Sync {
    async fn classify_review(&self, review_text: &str) -> EvalResult<ClassificationResult>;
}

/// Label written to the `predicted_label` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictedLabel {
    Positive,
    Negative,
    Neutral,
    /// Classification of this row failed
    Error,
}

impl PredictedLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictedLabel::Positive => "Positive",
            PredictedLabel::Negative => "Negative",
            PredictedLabel::Neutral => "Neutral",
            PredictedLabel::Error => "Error",
        }
    }

    /// The sentiment behind this label, `None` for `Error`
    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            PredictedLabel::Positive => Some(Sentiment::Positive),
            PredictedLabel::Negative => Some(Sentiment::Negative),
            PredictedLabel::Neutral => Some(Sentiment::Neutral),
            PredictedLabel::Error => None,
        }
    }
}

impl From<Sentiment> for PredictedLabel {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Positive => PredictedLabel::Positive,
            Sentiment::Negative => PredictedLabel::Negative,
            Sentiment::Neutral => PredictedLabel::Neutral,
        }
    }
}

impl fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictedLabel {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("error") {
            return Ok(PredictedLabel::Error);
        }
        s.parse::<Sentiment>().map(PredictedLabel::from)
    }
}

/// Row-level classification, the shape every output row carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: PredictedLabel,
    pub confidence: f64,
    pub explanation: String,
    pub evidence_phrases: Vec<String>,
}

impl Prediction {
    /// Default prediction for a row whose classification failed
    pub fn error(message: impl fmt::Display) -> Self {
        Self {
            label: PredictedLabel::Error,
            confidence: 0.0,
            explanation: format!("Error: {}", message),
            evidence_phrases: Vec::new(),
        }
    }

    /// Evidence phrases as written to the output file
    pub fn evidence_joined(&self) -> String {
        self.evidence_phrases.join(", ")
    }
}

impl From<ClassificationResult> for Prediction {
    fn from(result: ClassificationResult) -> Self {
        Self {
            label: result.label.into(),
            confidence: result.confidence,
            explanation: result.explanation,
            evidence_phrases: result.evidence_phrases,
        }
    }
}

/// Whether a row was classified or failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Ok,
    Error(String),
}

impl ItemStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, ItemStatus::Error(_))
    }
}

/// One review together with what the classifier made of it
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemOutcome {
    pub review: Review,
    pub prediction: Prediction,
    pub status: ItemStatus,
}

/// Totals reported after a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchItemOutcome]) -> Self {
        Self {
            processed: outcomes.len(),
            errors: outcomes.iter().filter(|o| o.status.is_error()).count(),
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processed {} reviews with {} errors", self.processed, self.errors)
    }
}

/// Progress callback: `(completed, total)`
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Runs a classifier over a sequence of reviews
#[derive(Clone)]
pub struct BatchRunner {
    classifier: Arc<dyn ReviewClassifier>,
    delay: Duration,
    progress: Option<Arc<ProgressFn>>,
}

impl BatchRunner {
    pub fn new(classifier: Arc<dyn ReviewClassifier>) -> Self {
        Self {
            classifier,
            delay: DEFAULT_REQUEST_DELAY,
            progress: None,
        }
    }

    /// Set the pause inserted between consecutive classifications
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Register a callback invoked with `(i, total)` as each item starts
    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Classify every review in order, one at a time
    pub async fn run(&self, reviews: &[Review]) -> Vec<BatchItemOutcome> {
        let total = reviews.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, review) in reviews.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            tracing::info!("Analyzing review {}/{}", i + 1, total);
            if let Some(progress) = &self.progress {
                progress(i + 1, total);
            }

            let (prediction, status) = self.classify_isolated(review).await;
            if let ItemStatus::Error(message) = &status {
                tracing::warn!(row = review.id, error = %message, "review classification failed");
            }

            outcomes.push(BatchItemOutcome {
                review: review.clone(),
                prediction,
                status,
            });
        }

        outcomes
    }

    async fn classify_isolated(&self, review: &Review) -> (Prediction, ItemStatus) {
        let call = AssertUnwindSafe(self.classifier.classify_review(&review.text));
        match call.catch_unwind().await {
            Ok(Ok(result)) => (result.into(), ItemStatus::Ok),
            Ok(Err(e)) => {
                let message = e.to_string();
                (Prediction::error(&message), ItemStatus::Error(message))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                (Prediction::error(&message), ItemStatus::Error(message))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("classifier panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("classifier panicked: {}", message)
    } else {
        "classifier panicked".to_string()
    }
}
