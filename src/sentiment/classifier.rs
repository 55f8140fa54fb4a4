// Sentiment Classifier

use super::prompt::build_prompt;
use super::validator::validate_response;
use super::{
    ClassificationResult, INVALID_INPUT_EXPLANATION, ORACLE_FAILURE_EXPLANATION,
    PARSE_FAILURE_EXPLANATION,
};
use crate::batch::ReviewClassifier;
use crate::client::{Oracle, OracleClient, SamplingConfig};
use crate::config::EvalConfig;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Why the classifier fell back to the default result
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Blank review; the oracle was never contacted
    InvalidInput,
    /// The oracle answered but the text broke the response schema
    MalformedOutput(String),
    /// The oracle call itself failed
    OracleFailure(String),
}

impl FallbackReason {
    pub fn explanation(&self) -> &'static str {
        match self {
            FallbackReason::InvalidInput => INVALID_INPUT_EXPLANATION,
            FallbackReason::MalformedOutput(_) => PARSE_FAILURE_EXPLANATION,
            FallbackReason::OracleFailure(_) => ORACLE_FAILURE_EXPLANATION,
        }
    }
}

/// Outcome of one classification before it is collapsed for callers
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Parsed(ClassificationResult),
    Fallback(FallbackReason),
}

impl Verdict {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Verdict::Fallback(_))
    }

    /// Collapse into a single always-valid result
    pub fn into_result(self) -> ClassificationResult {
        match self {
            Verdict::Parsed(result) => result,
            Verdict::Fallback(reason) => ClassificationResult::neutral_default(reason.explanation()),
        }
    }
}

/// Input guard applied before any oracle call.
///
/// Empty or whitespace-only text is `EvalError::InvalidInput`.
pub fn check_review_text(review_text: &str) -> EvalResult<&str> {
    if review_text.trim().is_empty() {
        return Err(EvalError::InvalidInput("review text is empty".to_string()));
    }
    Ok(review_text)
}

/// Classifies movie reviews by prompting an oracle and validating its answer
#[derive(Clone)]
pub struct SentimentClassifier {
    oracle: Arc<dyn Oracle>,
    sampling: SamplingConfig,
}

impl SentimentClassifier {
    /// Create a classifier over any oracle with the default sampling config
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            sampling: SamplingConfig::default(),
        }
    }

    /// Create a classifier backed by the HTTP oracle described by `config`
    pub fn from_config(config: &EvalConfig) -> EvalResult<Self> {
        let client = OracleClient::from_config(config)?;
        Ok(Self::new(Arc::new(client)).with_sampling(config.sampling))
    }

    /// Override the sampling parameters sent to the oracle
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// Classify a review, keeping track of whether a fallback was used
    pub async fn evaluate(&self, review_text: &str) -> Verdict {
        if let Err(e) = check_review_text(review_text) {
            tracing::debug!(error = %e, "rejecting review without calling the oracle");
            return Verdict::Fallback(FallbackReason::InvalidInput);
        }

        let prompt = build_prompt(review_text);
        let raw = match self.oracle.complete(&prompt, &self.sampling).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "oracle call failed, using neutral default");
                return Verdict::Fallback(FallbackReason::OracleFailure(e.to_string()));
            }
        };
        tracing::debug!(raw = %raw, "oracle response");

        match validate_response(&raw) {
            Ok(result) => Verdict::Parsed(result),
            Err(e) => {
                tracing::warn!(error = %e, raw = %raw, "invalid oracle response, using neutral default");
                Verdict::Fallback(FallbackReason::MalformedOutput(e.to_string()))
            }
        }
    }

    /// Classify a review. Never fails: any problem yields a Neutral default.
    pub async fn classify(&self, review_text: &str) -> ClassificationResult {
        self.evaluate(review_text).await.into_result()
    }
}

#[async_trait]
impl ReviewClassifier for SentimentClassifier {
    async fn classify_review(&self, review_text: &str) -> EvalResult<ClassificationResult> {
        Ok(self.classify(review_text).await)
    }
}
