//! Review sentiment classification.
//!
//! The pieces fit together as follows:
//!
//! - [`prompt`] renders the instruction + few-shot prompt for one review
//! - [`validator`] turns raw oracle text into a [`ClassificationResult`]
//! - [`classifier`] drives both against an [`Oracle`](crate::client::Oracle)
//!   and never fails: every problem collapses into a Neutral default
//!
//! ## Example
//!
//! ```no_run
//! use review_sentiment::{EvalConfig, SentimentClassifier};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = SentimentClassifier::from_config(&EvalConfig::from_env()?)?;
//! let result = classifier.classify("A gorgeous, moving film.").await;
//! println!("{} ({:.2})", result.label, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod prompt;
pub mod validator;

pub use classifier::{FallbackReason, SentimentClassifier, Verdict};

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Explanation attached to the default result for blank input
pub const INVALID_INPUT_EXPLANATION: &str = "Invalid input: empty or non-string review";
/// Explanation attached when the oracle's text could not be validated
pub const PARSE_FAILURE_EXPLANATION: &str = "JSON parsing error in analysis";
/// Explanation attached when the oracle call itself failed
pub const ORACLE_FAILURE_EXPLANATION: &str = "Error in analysis";

/// Sentiment label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Fixed label ordering used by every report and matrix
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Position of this label in [`Sentiment::ALL`]
    pub fn index(self) -> usize {
        match self {
            Sentiment::Positive => 0,
            Sentiment::Negative => 1,
            Sentiment::Neutral => 2,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; surrounding whitespace is ignored
impl FromStr for Sentiment {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Sentiment::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| EvalError::ValidationError(format!("Unknown sentiment label: {:?}", s)))
    }
}

/// Validated classification of a single review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Sentiment,
    pub confidence: f64,
    pub explanation: String,
    pub evidence_phrases: Vec<String>,
}

impl ClassificationResult {
    /// The safe default substituted whenever a real classification is unavailable
    pub fn neutral_default(explanation: impl Into<String>) -> Self {
        Self {
            label: Sentiment::Neutral,
            confidence: 0.0,
            explanation: explanation.into(),
            evidence_phrases: Vec::new(),
        }
    }
}
