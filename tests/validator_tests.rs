use pretty_assertions::assert_eq;
use review_sentiment::sentiment::validator::{validate_response, MAX_EVIDENCE_PHRASES};
use review_sentiment::sentiment::Sentiment;
use review_sentiment::types::EvalError;
use review_sentiment::utils::json_extractor::{extract_json_object, strip_code_fence};

fn assert_malformed(raw: &str, needle: &str) {
    match validate_response(raw) {
        Err(EvalError::MalformedOracleOutput { message, raw: Some(kept), .. }) => {
            assert!(message.contains(needle), "message {:?} lacks {:?}", message, needle);
            assert_eq!(kept, raw);
        }
        other => panic!("expected malformed output for {:?}, got {:?}", raw, other),
    }
}

#[test]
fn test_valid_response() {
    let raw = r#"{"label": "Neutral", "confidence": 0.55, "explanation": "Mixed feelings", "evidence_phrases": ["not bad", "not great"]}"#;
    let result = validate_response(raw).unwrap();

    assert_eq!(result.label, Sentiment::Neutral);
    assert_eq!(result.confidence, 0.55);
    assert_eq!(result.explanation, "Mixed feelings");
    assert_eq!(result.evidence_phrases, vec!["not bad", "not great"]);
}

#[test]
fn test_label_is_case_insensitive() {
    let raw = r#"{"label": "POSITIVE", "confidence": 1, "explanation": "", "evidence_phrases": []}"#;
    let result = validate_response(raw).unwrap();
    assert_eq!(result.label, Sentiment::Positive);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn test_missing_key_is_named() {
    assert_malformed(
        r#"{"label": "Positive", "confidence": 0.9, "explanation": "x"}"#,
        "evidence_phrases",
    );
    assert_malformed(
        r#"{"confidence": 0.9, "explanation": "x", "evidence_phrases": []}"#,
        "label",
    );
}

#[test]
fn test_unknown_label() {
    assert_malformed(
        r#"{"label": "Ecstatic", "confidence": 0.9, "explanation": "x", "evidence_phrases": []}"#,
        "label",
    );
    assert_malformed(
        r#"{"label": 1, "confidence": 0.9, "explanation": "x", "evidence_phrases": []}"#,
        "label",
    );
}

#[test]
fn test_confidence_bounds() {
    assert_malformed(
        r#"{"label": "Positive", "confidence": 1.01, "explanation": "x", "evidence_phrases": []}"#,
        "confidence",
    );
    assert_malformed(
        r#"{"label": "Positive", "confidence": -0.1, "explanation": "x", "evidence_phrases": []}"#,
        "confidence",
    );
    assert_malformed(
        r#"{"label": "Positive", "confidence": "high", "explanation": "x", "evidence_phrases": []}"#,
        "confidence",
    );
}

#[test]
fn test_explanation_must_be_string() {
    assert_malformed(
        r#"{"label": "Positive", "confidence": 0.5, "explanation": null, "evidence_phrases": []}"#,
        "explanation",
    );
}

#[test]
fn test_evidence_must_be_array_of_strings() {
    assert_malformed(
        r#"{"label": "Positive", "confidence": 0.5, "explanation": "x", "evidence_phrases": "great"}"#,
        "evidence_phrases",
    );
    assert_malformed(
        r#"{"label": "Positive", "confidence": 0.5, "explanation": "x", "evidence_phrases": ["great", 2]}"#,
        "evidence_phrases",
    );
}

#[test]
fn test_evidence_is_truncated() {
    let raw = r#"{"label": "Negative", "confidence": 0.8, "explanation": "x", "evidence_phrases": ["a", "b", "c", "d", "e"]}"#;
    let result = validate_response(raw).unwrap();
    assert_eq!(result.evidence_phrases.len(), MAX_EVIDENCE_PHRASES);
    assert_eq!(result.evidence_phrases, vec!["a", "b", "c"]);
}

#[test]
fn test_not_json() {
    assert_malformed("The sentiment is Positive.", "parse");
    assert_malformed("", "empty");
    assert_malformed("   ", "empty");
    assert_malformed("[1, 2, 3]", "array");
}

#[test]
fn test_strip_code_fence_variants() {
    assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fence("```JSON {\"a\": 1}```"), "{\"a\": 1}");
    // cut off before the closing fence
    assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
    assert_eq!(strip_code_fence("\n  {\"a\": 1}\n"), "{\"a\": 1}");
}

#[test]
fn test_extract_json_object_keeps_extra_keys() {
    let object = extract_json_object(r#"{"label": "Positive", "extra": true}"#).unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["extra"], serde_json::Value::Bool(true));
}
