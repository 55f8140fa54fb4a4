//! CSV input and output.
//!
//! Input files need a `review_text` column and may carry a `true_sentiment`
//! column for evaluation runs. Every other input column is kept and written
//! back out ahead of the prediction columns.

use crate::aggregate::{OutputRecord, OutputRecordSet, OUTPUT_COLUMNS};
use crate::batch::{ItemStatus, PredictedLabel, Prediction};
use crate::sentiment::Sentiment;
use crate::types::*;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::Path;

pub const REVIEW_TEXT_COLUMN: &str = "review_text";
pub const TRUE_SENTIMENT_COLUMN: &str = "true_sentiment";

/// A review read from the input file
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Zero-based row index in the input file
    pub id: usize,
    pub text: String,
    pub true_label: Option<Sentiment>,
    /// Raw input fields, aligned with the dataset's input columns
    pub columns: Vec<String>,
}

impl Review {
    /// A review whose only input column is its text
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            columns: vec![text.clone()],
            text,
            true_label: None,
        }
    }

    /// A review with `review_text` and `true_sentiment` input columns
    pub fn labeled(id: usize, text: impl Into<String>, label: Sentiment) -> Self {
        let text = text.into();
        Self {
            id,
            columns: vec![text.clone(), label.to_string()],
            text,
            true_label: Some(label),
        }
    }
}

/// Reviews plus the header row they were read with
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDataset {
    pub columns: Vec<String>,
    pub reviews: Vec<Review>,
}

impl ReviewDataset {
    /// Unlabeled dataset with a single `review_text` column
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec![REVIEW_TEXT_COLUMN.to_string()],
            reviews: texts
                .into_iter()
                .enumerate()
                .map(|(id, text)| Review::new(id, text))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Number of reviews per true label, in `Sentiment::ALL` order
    pub fn label_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for label in self.reviews.iter().filter_map(|r| r.true_label) {
            counts[label.index()] += 1;
        }
        counts
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(headers: &StringRecord, name: &str) -> EvalResult<usize> {
    column_index(headers, name).ok_or_else(|| EvalError::MissingColumn(name.to_string()))
}

fn parse_true_label(value: &str, row: usize) -> EvalResult<Option<Sentiment>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .parse::<Sentiment>()
        .map(Some)
        .map_err(|_| EvalError::InvalidLabel { value: value.to_string(), row })
}

/// Read reviews from CSV data.
///
/// Columns named like the prediction columns are dropped so a re-run
/// replaces earlier predictions instead of duplicating them.
pub fn read_reviews<R: io::Read>(reader: R) -> EvalResult<ReviewDataset> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let text_idx = require_column(&headers, REVIEW_TEXT_COLUMN)?;
    let label_idx = column_index(&headers, TRUE_SENTIMENT_COLUMN);
    let kept: Vec<usize> = (0..headers.len())
        .filter(|&i| !OUTPUT_COLUMNS.contains(&headers[i].trim()))
        .collect();

    let mut reviews = Vec::new();
    for (id, record) in reader.records().enumerate() {
        let record = record?;
        let text = record.get(text_idx).unwrap_or_default().to_string();
        let true_label = match label_idx.and_then(|i| record.get(i)) {
            Some(value) => parse_true_label(value, id)?,
            None => None,
        };
        reviews.push(Review {
            id,
            text,
            true_label,
            columns: kept.iter().map(|&i| record.get(i).unwrap_or_default().to_string()).collect(),
        });
    }

    Ok(ReviewDataset {
        columns: kept.iter().map(|&i| headers[i].to_string()).collect(),
        reviews,
    })
}

/// Read reviews from a CSV file
pub fn load_reviews(path: impl AsRef<Path>) -> EvalResult<ReviewDataset> {
    let file = File::open(path.as_ref())?;
    read_reviews(file)
}

/// Write an output record set as CSV
pub fn write_output<W: io::Write>(records: &OutputRecordSet, writer: W) -> EvalResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(records.headers())?;
    for row in records.rows() {
        writer.write_record(row.to_fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an output record set to a CSV file, replacing it if present
pub fn save_output(records: &OutputRecordSet, path: impl AsRef<Path>) -> EvalResult<()> {
    let file = File::create(path.as_ref())?;
    write_output(records, file)
}

/// Read a results file previously produced by [`write_output`]
///
/// `evidence_phrases` is split back on `", "`, so a phrase that itself
/// contains `", "` comes back as several phrases and a row may then hold
/// more than three. Metrics never read this column.
pub fn read_results<R: io::Read>(reader: R) -> EvalResult<OutputRecordSet> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let text_idx = require_column(&headers, REVIEW_TEXT_COLUMN)?;
    let label_idx = column_index(&headers, TRUE_SENTIMENT_COLUMN);
    let [predicted_idx, confidence_idx, explanation_idx, evidence_idx] = [
        require_column(&headers, OUTPUT_COLUMNS[0])?,
        require_column(&headers, OUTPUT_COLUMNS[1])?,
        require_column(&headers, OUTPUT_COLUMNS[2])?,
        require_column(&headers, OUTPUT_COLUMNS[3])?,
    ];
    let input_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| !OUTPUT_COLUMNS.contains(&headers[i].trim()))
        .collect();

    let mut rows = Vec::new();
    for (id, record) in reader.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default();

        let label = field(predicted_idx)
            .parse::<PredictedLabel>()
            .map_err(|_| EvalError::InvalidLabel { value: field(predicted_idx).to_string(), row: id })?;
        let confidence = field(confidence_idx).trim().parse::<f64>().map_err(|_| {
            EvalError::ValidationError(format!(
                "Row {}: confidence_score {:?} is not a number",
                id,
                field(confidence_idx)
            ))
        })?;
        let explanation = field(explanation_idx).to_string();
        let evidence_phrases = split_evidence(field(evidence_idx));

        let status = if label == PredictedLabel::Error {
            ItemStatus::Error(explanation.strip_prefix("Error: ").unwrap_or(explanation.as_str()).to_string())
        } else {
            ItemStatus::Ok
        };

        let true_label = match label_idx {
            Some(i) => parse_true_label(field(i), id)?,
            None => None,
        };

        rows.push(OutputRecord {
            review: Review {
                id,
                text: field(text_idx).to_string(),
                true_label,
                columns: input_idx.iter().map(|&i| field(i).to_string()).collect(),
            },
            prediction: Prediction {
                label,
                confidence,
                explanation,
                evidence_phrases,
            },
            status,
        });
    }

    Ok(OutputRecordSet::new(
        input_idx.iter().map(|&i| headers[i].to_string()).collect(),
        rows,
    ))
}

/// Read a results CSV file
pub fn load_results(path: impl AsRef<Path>) -> EvalResult<OutputRecordSet> {
    let file = File::open(path.as_ref())?;
    read_results(file)
}

/// Inverse of the `", "` join used on write; lossy for phrases containing it
fn split_evidence(joined: &str) -> Vec<String> {
    if joined.trim().is_empty() {
        return Vec::new();
    }
    joined.split(", ").map(str::to_string).collect()
}
