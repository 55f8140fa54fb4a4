// Result aggregation

use crate::batch::{BatchItemOutcome, ItemStatus, Prediction};
use crate::dataset::Review;
use crate::types::*;

/// Columns appended after the input columns, in output order
pub const OUTPUT_COLUMNS: [&str; 4] = [
    "predicted_label",
    "confidence_score",
    "explanation",
    "evidence_phrases",
];

/// One output row: the input review plus its prediction
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub review: Review,
    pub prediction: Prediction,
    pub status: ItemStatus,
}

impl OutputRecord {
    /// Input fields followed by the four prediction fields
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = self.review.columns.clone();
        fields.push(self.prediction.label.to_string());
        fields.push(self.prediction.confidence.to_string());
        fields.push(self.prediction.explanation.clone());
        fields.push(self.prediction.evidence_joined());
        fields
    }
}

/// Ordered output rows with the input header they share
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputRecordSet {
    input_columns: Vec<String>,
    rows: Vec<OutputRecord>,
}

impl OutputRecordSet {
    pub fn new(input_columns: Vec<String>, rows: Vec<OutputRecord>) -> Self {
        Self { input_columns, rows }
    }

    /// Build rows straight from batch outcomes, which already carry their review
    pub fn from_outcomes(input_columns: Vec<String>, outcomes: Vec<BatchItemOutcome>) -> Self {
        let rows = outcomes
            .into_iter()
            .map(|outcome| OutputRecord {
                review: outcome.review,
                prediction: outcome.prediction,
                status: outcome.status,
            })
            .collect();
        Self { input_columns, rows }
    }

    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    /// Full header row: input columns then [`OUTPUT_COLUMNS`]
    pub fn headers(&self) -> Vec<String> {
        self.input_columns
            .iter()
            .cloned()
            .chain(OUTPUT_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    pub fn rows(&self) -> &[OutputRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutputRecord> {
        self.rows.iter()
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.status.is_error()).count()
    }
}

impl<'a> IntoIterator for &'a OutputRecordSet {
    type Item = &'a OutputRecord;
    type IntoIter = std::slice::Iter<'a, OutputRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Pair each review with the outcome at the same position.
///
/// Fails with [`EvalError::ShapeMismatch`] when the two sequences differ in
/// length. Review fields always come from `reviews`; row order is input
/// order.
pub fn merge(
    input_columns: Vec<String>,
    reviews: &[Review],
    outcomes: Vec<BatchItemOutcome>,
) -> EvalResult<OutputRecordSet> {
    if reviews.len() != outcomes.len() {
        return Err(EvalError::ShapeMismatch {
            reviews: reviews.len(),
            outcomes: outcomes.len(),
        });
    }

    let rows = reviews
        .iter()
        .zip(outcomes)
        .map(|(review, outcome)| OutputRecord {
            review: review.clone(),
            prediction: outcome.prediction,
            status: outcome.status,
        })
        .collect();

    Ok(OutputRecordSet::new(input_columns, rows))
}
