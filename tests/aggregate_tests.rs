use pretty_assertions::assert_eq;
use review_sentiment::aggregate::{merge, OutputRecordSet, OUTPUT_COLUMNS};
use review_sentiment::batch::{BatchItemOutcome, ItemStatus, PredictedLabel, Prediction};
use review_sentiment::dataset::Review;
use review_sentiment::sentiment::{ClassificationResult, Sentiment};
use review_sentiment::types::EvalError;

fn ok_outcome(review: Review, label: Sentiment) -> BatchItemOutcome {
    BatchItemOutcome {
        review,
        prediction: ClassificationResult {
            label,
            confidence: 0.8,
            explanation: "clear".into(),
            evidence_phrases: vec!["a".into(), "b".into()],
        }
        .into(),
        status: ItemStatus::Ok,
    }
}

fn columns() -> Vec<String> {
    vec!["review_text".to_string(), "true_sentiment".to_string()]
}

#[test]
fn test_merge_pairs_by_position() {
    let reviews = vec![
        Review::labeled(0, "first", Sentiment::Positive),
        Review::labeled(1, "second", Sentiment::Negative),
    ];
    let outcomes = vec![
        ok_outcome(reviews[0].clone(), Sentiment::Positive),
        ok_outcome(reviews[1].clone(), Sentiment::Neutral),
    ];

    let records = merge(columns(), &reviews, outcomes).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.rows()[0].review.text, "first");
    assert_eq!(records.rows()[1].review.text, "second");
    assert_eq!(records.rows()[1].prediction.label, PredictedLabel::Neutral);
    assert_eq!(records.error_count(), 0);
}

#[test]
fn test_merge_keeps_input_fields_from_reviews() {
    let reviews = vec![Review::labeled(0, "from input", Sentiment::Positive)];
    let outcomes = vec![ok_outcome(Review::new(0, "something else"), Sentiment::Positive)];

    let records = merge(columns(), &reviews, outcomes).unwrap();

    assert_eq!(records.rows()[0].review, reviews[0]);
}

#[test]
fn test_merge_shape_mismatch() {
    let reviews = vec![
        Review::new(0, "a"),
        Review::new(1, "b"),
        Review::new(2, "c"),
    ];
    let outcomes = vec![ok_outcome(reviews[0].clone(), Sentiment::Positive)];

    match merge(columns(), &reviews, outcomes) {
        Err(EvalError::ShapeMismatch { reviews, outcomes }) => {
            assert_eq!((reviews, outcomes), (3, 1));
        }
        other => panic!("expected shape mismatch, got {:?}", other),
    }
}

#[test]
fn test_merge_empty() {
    let records = merge(columns(), &[], Vec::new()).unwrap();
    assert!(records.is_empty());
    assert_eq!(records.input_columns(), columns().as_slice());
}

#[test]
fn test_headers_append_output_columns() {
    let records = OutputRecordSet::new(columns(), Vec::new());
    let headers = records.headers();

    assert_eq!(headers.len(), 2 + OUTPUT_COLUMNS.len());
    assert_eq!(&headers[..2], columns().as_slice());
    assert_eq!(&headers[2..], OUTPUT_COLUMNS.map(String::from).as_slice());
}

#[test]
fn test_record_fields() {
    let review = Review::labeled(4, "Great cast", Sentiment::Positive);
    let ok = ok_outcome(review.clone(), Sentiment::Positive);
    let failed = BatchItemOutcome {
        review: review.clone(),
        prediction: Prediction::error("bad gateway"),
        status: ItemStatus::Error("bad gateway".into()),
    };

    let records = OutputRecordSet::from_outcomes(columns(), vec![ok, failed]);

    assert_eq!(
        records.rows()[0].to_fields(),
        vec!["Great cast", "Positive", "Positive", "0.8", "clear", "a, b"]
    );
    assert_eq!(
        records.rows()[1].to_fields(),
        vec!["Great cast", "Positive", "Error", "0", "Error: bad gateway", ""]
    );
    assert_eq!(records.error_count(), 1);
}
