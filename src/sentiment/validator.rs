//! Schema enforcement for oracle responses.
//!
//! The oracle is asked for a JSON object with exactly four keys. This module
//! checks that the text it actually returned honours that contract and
//! decodes it into a [`ClassificationResult`]. Every violation is reported as
//! [`EvalError::MalformedOracleOutput`]; recovering from it is the
//! classifier's job.

use super::{ClassificationResult, Sentiment};
use crate::malformed_output;
use crate::types::*;
use crate::utils::json_extractor::extract_json_object;
use serde_json::{Map, Value};

/// Keys every response object must carry
pub const REQUIRED_KEYS: [&str; 4] = ["label", "confidence", "explanation", "evidence_phrases"];

/// Phrases beyond this count are dropped
pub const MAX_EVIDENCE_PHRASES: usize = 3;

/// Parse and validate raw oracle text
///
/// # Examples
///
/// ```
/// use review_sentiment::sentiment::{validator::validate_response, Sentiment};
///
/// let raw = r#"```json
/// {"label": "Positive", "confidence": 0.9, "explanation": "Loved it", "evidence_phrases": ["loved"]}
/// ```"#;
/// let result = validate_response(raw).unwrap();
/// assert_eq!(result.label, Sentiment::Positive);
/// ```
pub fn validate_response(raw: &str) -> EvalResult<ClassificationResult> {
    let object = extract_json_object(raw)?;

    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(malformed_output!(
            format!("Response is missing required key `{}`", missing),
            raw.to_string()
        ));
    }

    Ok(ClassificationResult {
        label: decode_label(&object, raw)?,
        confidence: decode_confidence(&object, raw)?,
        explanation: decode_explanation(&object, raw)?,
        evidence_phrases: decode_evidence(&object, raw)?,
    })
}

fn decode_label(object: &Map<String, Value>, raw: &str) -> EvalResult<Sentiment> {
    match &object["label"] {
        Value::String(label) => label.parse::<Sentiment>().map_err(|_| {
            malformed_output!(format!("`label` is not a known sentiment: {:?}", label), raw.to_string())
        }),
        other => Err(malformed_output!(
            format!("`label` must be a string, got {}", other),
            raw.to_string()
        )),
    }
}

fn decode_confidence(object: &Map<String, Value>, raw: &str) -> EvalResult<f64> {
    let confidence = object["confidence"].as_f64().ok_or_else(|| {
        malformed_output!(
            format!("`confidence` must be a number, got {}", object["confidence"]),
            raw.to_string()
        )
    })?;

    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(malformed_output!(
            format!("`confidence` must be within [0, 1], got {}", confidence),
            raw.to_string()
        ));
    }
    Ok(confidence)
}

fn decode_explanation(object: &Map<String, Value>, raw: &str) -> EvalResult<String> {
    object["explanation"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed_output!("`explanation` must be a string", raw.to_string()))
}

fn decode_evidence(object: &Map<String, Value>, raw: &str) -> EvalResult<Vec<String>> {
    let items = object["evidence_phrases"].as_array().ok_or_else(|| {
        malformed_output!("`evidence_phrases` must be an array", raw.to_string())
    })?;

    let mut phrases = Vec::with_capacity(items.len().min(MAX_EVIDENCE_PHRASES));
    for item in items {
        let phrase = item.as_str().ok_or_else(|| {
            malformed_output!(
                format!("`evidence_phrases` must contain strings, got {}", item),
                raw.to_string()
            )
        })?;
        phrases.push(phrase.to_string());
    }

    if phrases.len() > MAX_EVIDENCE_PHRASES {
        tracing::debug!(count = phrases.len(), "truncating evidence phrases");
        phrases.truncate(MAX_EVIDENCE_PHRASES);
    }
    Ok(phrases)
}
