// Interactive analysis session

use crate::sentiment::{ClassificationResult, Sentiment, SentimentClassifier};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One analyzed review kept in a session's history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub review_text: String,
    pub result: ClassificationResult,
}

/// Aggregate view over a session's history
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionSummary {
    pub total: usize,
    /// Results per label, in `Sentiment::ALL` order
    pub counts: [usize; 3],
    pub mean_confidence: Option<f64>,
}

impl SessionSummary {
    pub fn count(&self, label: Sentiment) -> usize {
        self.counts[label.index()]
    }
}

/// # Analysis Session
///
/// Classifies reviews one at a time on behalf of a single interactive user
/// and remembers what was analyzed. History belongs to the session: create
/// one per user and drop or [`clear_history`](Self::clear_history) it when
/// done.
///
/// ```no_run
/// # use review_sentiment::{AnalysisSession, EvalConfig, SentimentClassifier};
/// # use std::sync::Arc;
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let classifier = Arc::new(SentimentClassifier::from_config(&EvalConfig::from_env()?)?);
/// let session = AnalysisSession::new(classifier);
/// session.analyze("Two hours I will never get back.").await;
/// assert_eq!(session.history_size().await, 1);
/// # Ok(())
/// # }
/// ```
pub struct AnalysisSession {
    classifier: Arc<SentimentClassifier>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl AnalysisSession {
    pub fn new(classifier: Arc<SentimentClassifier>) -> Self {
        Self {
            classifier,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Classify a review and append it to the history
    pub async fn analyze(&self, review_text: &str) -> ClassificationResult {
        let result = self.classifier.classify(review_text).await;
        let mut history = self.history.lock().await;
        history.push(HistoryEntry {
            review_text: review_text.to_string(),
            result: result.clone(),
        });
        result
    }

    /// Snapshot of the history, oldest first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.clone()
    }

    /// The `n` most recent entries, newest first
    pub async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let history = self.history.lock().await;
        history.iter().rev().take(n).cloned().collect()
    }

    pub async fn history_size(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    pub async fn summary(&self) -> SessionSummary {
        let history = self.history.lock().await;
        let mut summary = SessionSummary {
            total: history.len(),
            ..SessionSummary::default()
        };
        for entry in history.iter() {
            summary.counts[entry.result.label.index()] += 1;
        }
        if !history.is_empty() {
            let sum: f64 = history.iter().map(|e| e.result.confidence).sum();
            summary.mean_confidence = Some(sum / history.len() as f64);
        }
        summary
    }
}
