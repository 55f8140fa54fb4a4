//! Evaluation metrics for labeled prediction sets.
//!
//! [`compute`] turns an [`OutputRecordSet`] whose rows all carry a true
//! label into a [`MetricsReport`]: accuracy, a per-class precision / recall /
//! F1 report, a confusion matrix over `[Positive, Negative, Neutral]`,
//! per-class accuracy and confidence averages. Rows predicted as `Error`
//! count as wrong and sit outside the confusion matrix.
//!
//! Values that have no rows to average over are `None` rather than `0.0`
//! or `NaN`, and render as `undefined`.

use crate::aggregate::OutputRecordSet;
use crate::batch::PredictedLabel;
use crate::sentiment::Sentiment;
use crate::types::*;
use std::fmt;

/// The fields of one row the metrics need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPrediction {
    pub true_label: Sentiment,
    pub predicted: PredictedLabel,
    pub confidence: f64,
}

impl ScoredPrediction {
    pub fn is_correct(&self) -> bool {
        self.predicted.sentiment() == Some(self.true_label)
    }
}

/// Counts of (true, predicted) pairs; rows = true label, columns = predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    counts: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    pub fn get(&self, actual: Sentiment, predicted: Sentiment) -> usize {
        self.counts[actual.index()][predicted.index()]
    }

    pub fn row(&self, actual: Sentiment) -> [usize; 3] {
        self.counts[actual.index()]
    }

    pub fn as_array(&self) -> &[[usize; 3]; 3] {
        &self.counts
    }

    /// Rows that landed inside the matrix
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn true_positives(&self, class: Sentiment) -> usize {
        self.get(class, class)
    }

    /// Everything predicted as `class` that was something else
    fn false_positives(&self, class: Sentiment) -> usize {
        Sentiment::ALL
            .iter()
            .filter(|&&actual| actual != class)
            .map(|&actual| self.get(actual, class))
            .sum()
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Rows whose true label is this class
    pub support: usize,
}

/// Macro or weighted average over the three classes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision / recall / F1 with macro and weighted averages
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    per_class: [ClassMetrics; 3],
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total: usize,
}

impl ClassificationReport {
    pub fn class(&self, class: Sentiment) -> &ClassMetrics {
        &self.per_class[class.index()]
    }
}

/// Correct predictions over rows of one true class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassAccuracy {
    pub correct: usize,
    pub total: usize,
}

impl ClassAccuracy {
    /// `None` when no row has this true label
    pub fn value(&self) -> Option<f64> {
        ratio(self.correct, self.total)
    }
}

/// Read-only snapshot of every metric over a labeled record set
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    class_counts: [usize; 3],
    pub confusion: ConfusionMatrix,
    /// Rows predicted as `Error`
    pub unclassified: usize,
    per_class_accuracy: [ClassAccuracy; 3],
    pub mean_confidence: f64,
    mean_confidence_by_prediction: [Option<f64>; 3],
    pub report: ClassificationReport,
}

impl MetricsReport {
    /// Number of rows whose true label is `class`
    pub fn class_count(&self, class: Sentiment) -> usize {
        self.class_counts[class.index()]
    }

    pub fn class_accuracy(&self, class: Sentiment) -> ClassAccuracy {
        self.per_class_accuracy[class.index()]
    }

    /// Mean confidence of rows predicted as `class`; `None` if there are none
    pub fn mean_confidence_for(&self, class: Sentiment) -> Option<f64> {
        self.mean_confidence_by_prediction[class.index()]
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Compute the metrics report for a labeled record set.
///
/// Fails with [`EvalError::EmptyDataset`] on zero rows and
/// [`EvalError::MissingTrueLabel`] when a row has no true label.
pub fn compute(records: &OutputRecordSet) -> EvalResult<MetricsReport> {
    let rows = records
        .iter()
        .map(|record| -> EvalResult<ScoredPrediction> {
            let true_label = record
                .review
                .true_label
                .ok_or(EvalError::MissingTrueLabel { row: record.review.id })?;
            Ok(ScoredPrediction {
                true_label,
                predicted: record.prediction.label,
                confidence: record.prediction.confidence,
            })
        })
        .collect::<EvalResult<Vec<_>>>()?;

    compute_from_predictions(&rows)
}

/// Compute the metrics report from bare (true, predicted, confidence) rows
pub fn compute_from_predictions(rows: &[ScoredPrediction]) -> EvalResult<MetricsReport> {
    if rows.is_empty() {
        return Err(EvalError::EmptyDataset);
    }

    let total = rows.len();
    let mut confusion = ConfusionMatrix::default();
    let mut class_counts = [0usize; 3];
    let mut unclassified = 0;

    for row in rows {
        class_counts[row.true_label.index()] += 1;
        match row.predicted.sentiment() {
            Some(predicted) => confusion.counts[row.true_label.index()][predicted.index()] += 1,
            None => unclassified += 1,
        }
    }

    let correct = rows.iter().filter(|row| row.is_correct()).count();
    let accuracy = correct as f64 / total as f64;

    let per_class_accuracy = Sentiment::ALL.map(|class| ClassAccuracy {
        correct: confusion.true_positives(class),
        total: class_counts[class.index()],
    });

    let mean_confidence = mean(rows.iter().map(|row| row.confidence)).unwrap_or(0.0);
    let mean_confidence_by_prediction = Sentiment::ALL.map(|class| {
        mean(
            rows.iter()
                .filter(|row| row.predicted == PredictedLabel::from(class))
                .map(|row| row.confidence),
        )
    });

    let report = classification_report(&confusion, &class_counts, accuracy, total);

    Ok(MetricsReport {
        total,
        correct,
        accuracy,
        class_counts,
        confusion,
        unclassified,
        per_class_accuracy,
        mean_confidence,
        mean_confidence_by_prediction,
        report,
    })
}

/// Standard multi-class report; a zero denominator yields 0.0
fn classification_report(
    confusion: &ConfusionMatrix,
    class_counts: &[usize; 3],
    accuracy: f64,
    total: usize,
) -> ClassificationReport {
    let per_class = Sentiment::ALL.map(|class| {
        let tp = confusion.true_positives(class);
        let fp = confusion.false_positives(class);
        let support = class_counts[class.index()];

        // support = TP + FN, Error rows included in FN
        let precision = ratio(tp, tp + fp).unwrap_or(0.0);
        let recall = ratio(tp, support).unwrap_or(0.0);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics { precision, recall, f1, support }
    });

    let n_classes = per_class.len() as f64;
    let macro_avg = AverageMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n_classes,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n_classes,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / n_classes,
        support: total,
    };

    let weighted = |metric: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            return 0.0;
        }
        per_class
            .iter()
            .map(|m| metric(m) * m.support as f64)
            .sum::<f64>()
            / total as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|m: &ClassMetrics| m.precision),
        recall: weighted(|m: &ClassMetrics| m.recall),
        f1: weighted(|m: &ClassMetrics| m.f1),
        support: total,
    };

    ClassificationReport {
        per_class,
        accuracy,
        macro_avg,
        weighted_avg,
        total,
    }
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "undefined".to_string(),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for class in Sentiment::ALL {
            let m = self.class(class);
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                class.as_str(), m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>12} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.total)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for class in Sentiment::ALL {
            write!(f, " {:>9}", class.as_str())?;
        }
        writeln!(f)?;
        for actual in Sentiment::ALL {
            write!(f, "{:>10}", actual.as_str())?;
            for count in self.row(actual) {
                write!(f, " {:>9}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PERFORMANCE METRICS ===")?;
        writeln!(f, "Accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "Number of reviews: {}", self.total)?;
        for class in Sentiment::ALL {
            writeln!(f, "{} reviews: {}", class, self.class_count(class))?;
        }

        writeln!(f, "\n=== CLASSIFICATION REPORT ===")?;
        write!(f, "{}", self.report)?;

        writeln!(f, "\n=== CONFUSION MATRIX ===")?;
        writeln!(f, "Rows: Actual, Columns: Predicted")?;
        write!(f, "{}", self.confusion)?;
        if self.unclassified > 0 {
            writeln!(f, "Rows predicted as Error (outside the matrix): {}", self.unclassified)?;
        }

        writeln!(f, "\n=== PER-CLASS ACCURACY ===")?;
        for class in Sentiment::ALL {
            let acc = self.class_accuracy(class);
            let value = match acc.value() {
                Some(v) => format!("{:.2}%", v * 100.0),
                None => "undefined".to_string(),
            };
            writeln!(f, "{}: {} ({}/{})", class, value, acc.correct, acc.total)?;
        }

        writeln!(f, "\n=== AVERAGE CONFIDENCE ===")?;
        writeln!(f, "Overall: {:.2}", self.mean_confidence)?;
        for class in Sentiment::ALL {
            writeln!(f, "{}: {}", class, format_optional(self.mean_confidence_for(class), 2))?;
        }
        Ok(())
    }
}
