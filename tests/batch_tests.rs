use pretty_assertions::assert_eq;
use review_sentiment::batch::{BatchRunner, BatchSummary, ItemStatus, PredictedLabel, Prediction};
use review_sentiment::dataset::Review;
use review_sentiment::sentiment::{SentimentClassifier, ORACLE_FAILURE_EXPLANATION};
use review_sentiment::types::EvalError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;


use mock_oracle::{oracle_json, MockOracle, Reply, ScriptedClassifier};

fn reviews(texts: &[&str]) -> Vec<Review> {
    texts.iter().enumerate().map(|(i, t)| Review::new(i, *t)).collect()
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Reply::Text(oracle_json("Positive", 0.9, &["great"])),
        Reply::Text(oracle_json("Negative", 0.8, &["awful"])),
        Reply::Text(oracle_json("Neutral", 0.5, &[])),
    ]));
    let runner = BatchRunner::new(classifier.clone()).with_delay(Duration::ZERO);
    let input = reviews(&["great", "awful", "fine"]);

    let outcomes = runner.run(&input).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(classifier.seen(), vec!["great", "awful", "fine"]);
    let labels: Vec<_> = outcomes.iter().map(|o| o.prediction.label).collect();
    assert_eq!(
        labels,
        vec![PredictedLabel::Positive, PredictedLabel::Negative, PredictedLabel::Neutral]
    );
    for (outcome, review) in outcomes.iter().zip(&input) {
        assert_eq!(&outcome.review, review);
        assert_eq!(outcome.status, ItemStatus::Ok);
    }
}

#[tokio::test]
async fn test_failure_is_isolated() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Reply::Text(oracle_json("Positive", 0.9, &[])),
        Reply::Fail(EvalError::simple_oracle_unavailable("upstream down")),
        Reply::Text(oracle_json("Negative", 0.7, &[])),
    ]));
    let runner = BatchRunner::new(classifier).with_delay(Duration::ZERO);

    let outcomes = runner.run(&reviews(&["a", "b", "c"])).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].prediction.label, PredictedLabel::Positive);
    assert_eq!(outcomes[2].prediction.label, PredictedLabel::Negative);

    let failed = &outcomes[1];
    assert!(failed.status.is_error());
    assert_eq!(failed.prediction.label, PredictedLabel::Error);
    assert_eq!(failed.prediction.confidence, 0.0);
    assert!(failed.prediction.explanation.starts_with("Error: "));
    assert!(failed.prediction.explanation.contains("upstream down"));
    assert!(failed.prediction.evidence_phrases.is_empty());

    let summary = BatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary, BatchSummary { processed: 3, errors: 1 });
    assert_eq!(summary.to_string(), "Processed 3 reviews with 1 errors");
}

#[tokio::test]
async fn test_panic_is_isolated() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Reply::Panic("boom".into()),
        Reply::Text(oracle_json("Positive", 0.6, &[])),
    ]));
    let runner = BatchRunner::new(classifier).with_delay(Duration::ZERO);

    let outcomes = runner.run(&reviews(&["x", "y"])).await;

    match &outcomes[0].status {
        ItemStatus::Error(message) => assert!(message.contains("boom")),
        ItemStatus::Ok => panic!("panicking item should be an error"),
    }
    assert_eq!(outcomes[1].status, ItemStatus::Ok);
    assert_eq!(outcomes[1].prediction.label, PredictedLabel::Positive);
}

#[tokio::test]
async fn test_oracle_failure_stays_neutral_through_classifier() {
    let oracle = Arc::new(MockOracle::failing(EvalError::OracleTimeout { location: None }));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle)))
        .with_delay(Duration::ZERO);

    let outcomes = runner.run(&reviews(&["anything"])).await;

    assert_eq!(outcomes[0].status, ItemStatus::Ok);
    assert_eq!(outcomes[0].prediction.label, PredictedLabel::Neutral);
    assert_eq!(outcomes[0].prediction.explanation, ORACLE_FAILURE_EXPLANATION);
}

#[tokio::test]
async fn test_empty_input() {
    let oracle = Arc::new(MockOracle::always(oracle_json("Positive", 0.9, &[])));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle.clone())));

    let outcomes = runner.run(&[]).await;

    assert!(outcomes.is_empty());
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_delay_between_items_only() {
    let started = Arc::new(Mutex::new(Vec::new()));
    let origin = Instant::now();
    let recorder = started.clone();

    let oracle = Arc::new(MockOracle::always(oracle_json("Neutral", 0.5, &[])));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle)))
        .with_delay(Duration::from_secs(1))
        .with_progress(move |_, _| recorder.lock().unwrap().push(origin.elapsed()));

    runner.run(&reviews(&["a", "b", "c"])).await;

    let started = started.lock().unwrap().clone();
    assert_eq!(started.len(), 3);
    assert!(started[0] < Duration::from_millis(10));
    for (i, at) in started.iter().enumerate() {
        let expected = Duration::from_secs(i as u64);
        assert!(*at >= expected && *at < expected + Duration::from_millis(10), "item {} started at {:?}", i, at);
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_item_has_no_delay() {
    let oracle = Arc::new(MockOracle::always(oracle_json("Neutral", 0.5, &[])));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle)))
        .with_delay(Duration::from_secs(5));
    let origin = Instant::now();

    runner.run(&reviews(&["only"])).await;

    assert!(origin.elapsed() < Duration::from_millis(10));
}

#[tokio::test]
async fn test_progress_reports_counter() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let oracle = Arc::new(MockOracle::always(oracle_json("Neutral", 0.5, &[])));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle)))
        .with_delay(Duration::ZERO)
        .with_progress(move |i, total| recorder.lock().unwrap().push((i, total)));

    runner.run(&reviews(&["a", "b"])).await;

    assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
}

#[test]
fn test_error_prediction_shape() {
    let prediction = Prediction::error("quota exceeded");
    assert_eq!(prediction.label, PredictedLabel::Error);
    assert_eq!(prediction.explanation, "Error: quota exceeded");
    assert_eq!(prediction.label.to_string(), "Error");
    assert_eq!(prediction.label.sentiment(), None);
    assert_eq!("error".parse::<PredictedLabel>().unwrap(), PredictedLabel::Error);
}

#[tokio::test]
async fn test_every_item_failing_keeps_shape() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Reply::Fail(EvalError::simple_oracle_unavailable("down")),
        Reply::Fail(EvalError::OracleTimeout { location: None }),
        Reply::Fail(EvalError::rate_limited(None)),
        Reply::Fail(EvalError::simple_oracle_unavailable("still down")),
    ]));
    let runner = BatchRunner::new(classifier).with_delay(Duration::ZERO);
    let input = reviews(&["a", "b", "c", "d"]);

    let outcomes = runner.run(&input).await;

    assert_eq!(outcomes.len(), input.len());
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.review.id, i);
        assert_eq!(outcome.review, input[i]);
        assert!(outcome.status.is_error());
        assert_eq!(outcome.prediction.label, PredictedLabel::Error);
    }
    assert_eq!(BatchSummary::from_outcomes(&outcomes).errors, 4);
}

#[tokio::test]
async fn test_every_oracle_call_failing_keeps_shape() {
    let oracle = Arc::new(MockOracle::failing(EvalError::simple_oracle_unavailable("down")));
    let runner = BatchRunner::new(Arc::new(SentimentClassifier::new(oracle.clone())))
        .with_delay(Duration::ZERO);
    let input = reviews(&["first", "second", "third"]);

    let outcomes = runner.run(&input).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(oracle.call_count(), 3);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.review.id, i);
        assert_eq!(outcome.review.text, input[i].text);
        assert_eq!(outcome.status, ItemStatus::Ok);
        assert_eq!(outcome.prediction.label, PredictedLabel::Neutral);
        assert_eq!(outcome.prediction.explanation, ORACLE_FAILURE_EXPLANATION);
    }
}
