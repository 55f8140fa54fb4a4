//! JSON extraction utilities
//!
//! Oracles asked for "only JSON" still tend to wrap the object in a
//! markdown fence (```` ```json ... ``` ````). These helpers peel that
//! wrapper off so the payload can be handed to `serde_json`. Nothing
//! here searches for JSON embedded in prose: text that is not a bare
//! or fenced JSON document is left for the parser to reject.

use crate::types::*;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Whole-text fence with an optional language tag; closing fence optional
    // because a length-capped completion can be cut off before it.
    static ref FENCED_BLOCK_REGEX: Regex =
        Regex::new(r"(?s)^```[ \t]*(?:[A-Za-z0-9_-]+)?[ \t]*\r?\n?(.*?)\s*(?:```)?\s*$").unwrap();
}

/// Strip surrounding whitespace and an optional fenced code block
///
/// # Examples
///
/// ```
/// use review_sentiment::utils::json_extractor::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
/// ```
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    match FENCED_BLOCK_REGEX.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Extract a JSON object from raw oracle text
///
/// Returns the parsed object, or `MalformedOracleOutput` when the text
/// (after fence stripping) is not a JSON object.
pub fn extract_json_object(text: &str) -> EvalResult<serde_json::Map<String, serde_json::Value>> {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return Err(crate::malformed_output!("Oracle returned an empty response", text.to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        crate::malformed_output!(format!("Failed to parse JSON: {}", e), text.to_string())
    })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(crate::malformed_output!(
            format!("Expected a JSON object, got {}", json_kind(&other)),
            text.to_string()
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
