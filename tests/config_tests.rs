use pretty_assertions::assert_eq;
use review_sentiment::client::{SamplingConfig, DEFAULT_BASE_URL};
use review_sentiment::config::{EvalConfig, API_KEY_VAR};
use review_sentiment::types::{ClaudeModel, EvalError};
use std::collections::HashMap;
use std::time::Duration;

fn load(vars: &[(&str, &str)]) -> Result<EvalConfig, EvalError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EvalConfig::from_lookup(|name| map.get(name).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[(API_KEY_VAR, "sk-test")]).unwrap();

    assert_eq!(config.api_key.as_str(), "sk-test");
    assert_eq!(config.model, ClaudeModel::Haiku);
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.sampling, SamplingConfig { temperature: 0.1, max_output_tokens: 200 });
    assert_eq!(config.request_delay, Duration::from_secs(1));
    assert_eq!(config.request_timeout, Duration::from_secs(60));
}

#[test]
fn test_missing_or_blank_key() {
    assert!(matches!(load(&[]), Err(EvalError::MissingApiKey { .. })));
    assert!(matches!(load(&[(API_KEY_VAR, "  ")]), Err(EvalError::MissingApiKey { .. })));
}

#[test]
fn test_overrides() {
    let config = load(&[
        (API_KEY_VAR, "sk-test"),
        ("SENTIMENT_MODEL", "claude-3-5-sonnet-20240620"),
        ("ANTHROPIC_BASE_URL", "http://localhost:9000/v1/"),
        ("SENTIMENT_TEMPERATURE", "0"),
        ("SENTIMENT_MAX_TOKENS", "150"),
        ("SENTIMENT_REQUEST_DELAY_MS", "250"),
        ("SENTIMENT_TIMEOUT_SECS", "5"),
    ])
    .unwrap();

    assert_eq!(config.model, ClaudeModel::Sonnet35);
    assert_eq!(config.base_url, "http://localhost:9000/v1");
    assert_eq!(config.sampling.temperature, 0.0);
    assert_eq!(config.sampling.max_output_tokens, 150);
    assert_eq!(config.request_delay, Duration::from_millis(250));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
}

#[test]
fn test_custom_model_id() {
    let config = load(&[(API_KEY_VAR, "sk-test"), ("SENTIMENT_MODEL", "my-fine-tune")]).unwrap();
    assert_eq!(config.model, ClaudeModel::Custom("my-fine-tune".into()));
}

#[test]
fn test_invalid_values() {
    let cases = [
        ("ANTHROPIC_BASE_URL", "not a url"),
        ("ANTHROPIC_BASE_URL", "ftp://example.com"),
        ("SENTIMENT_TEMPERATURE", "1.5"),
        ("SENTIMENT_TEMPERATURE", "warm"),
        ("SENTIMENT_MAX_TOKENS", "0"),
        ("SENTIMENT_MAX_TOKENS", "-3"),
        ("SENTIMENT_REQUEST_DELAY_MS", "soon"),
        ("SENTIMENT_TIMEOUT_SECS", "0"),
        ("SENTIMENT_MODEL", " "),
    ];

    for (name, value) in cases {
        let result = load(&[(API_KEY_VAR, "sk-test"), (name, value)]);
        assert!(
            matches!(result, Err(EvalError::Config(_))),
            "{}={:?} should be rejected, got {:?}",
            name,
            value,
            result.map(|c| c.base_url)
        );
    }
}

#[test]
fn test_api_key_is_redacted() {
    let config = EvalConfig::new("sk-very-secret");
    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-very-secret"));
}
