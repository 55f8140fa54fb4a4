// Runtime configuration

use crate::batch::DEFAULT_REQUEST_DELAY;
use crate::client::{SamplingConfig, DEFAULT_BASE_URL};
use crate::types::*;
use crate::utils::validate_range;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const MODEL_VAR: &str = "SENTIMENT_MODEL";
pub const TEMPERATURE_VAR: &str = "SENTIMENT_TEMPERATURE";
pub const MAX_TOKENS_VAR: &str = "SENTIMENT_MAX_TOKENS";
pub const REQUEST_DELAY_VAR: &str = "SENTIMENT_REQUEST_DELAY_MS";
pub const TIMEOUT_VAR: &str = "SENTIMENT_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to talk to the oracle and pace a batch run
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub api_key: SecureApiKey,
    pub model: ClaudeModel,
    pub base_url: String,
    pub sampling: SamplingConfig,
    pub request_delay: Duration,
    pub request_timeout: Duration,
}

impl EvalConfig {
    /// Defaults for everything except the API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecureApiKey::new(api_key),
            model: ClaudeModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sampling: SamplingConfig::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load from the process environment, reading a `.env` file first if present
    pub fn from_env() -> EvalResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> EvalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(EvalError::MissingApiKey { location: Some(API_KEY_VAR.to_string()) })?;

        let mut config = Self::new(api_key);

        if let Some(model) = lookup(MODEL_VAR) {
            config = config.with_model(model.parse()?);
        }
        if let Some(url) = lookup(BASE_URL_VAR) {
            config = config.with_base_url(url)?;
        }
        if let Some(value) = lookup(TEMPERATURE_VAR) {
            config = config.with_temperature(parse_var(TEMPERATURE_VAR, &value)?)?;
        }
        if let Some(value) = lookup(MAX_TOKENS_VAR) {
            config = config.with_max_output_tokens(parse_var(MAX_TOKENS_VAR, &value)?)?;
        }
        if let Some(value) = lookup(REQUEST_DELAY_VAR) {
            config = config.with_request_delay(Duration::from_millis(parse_var(REQUEST_DELAY_VAR, &value)?));
        }
        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs: u64 = parse_var(TIMEOUT_VAR, &value)?;
            if secs == 0 {
                return Err(EvalError::Config(format!("{} must be greater than 0", TIMEOUT_VAR)));
            }
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        self.model = model;
        self
    }

    /// Set the API base URL; must be an absolute http(s) URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> EvalResult<Self> {
        let url = url.into();
        let parsed = url::Url::parse(url.trim())
            .map_err(|e| EvalError::Config(format!("Invalid base URL {:?}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EvalError::Config(format!("Base URL must use http or https: {}", url)));
        }
        self.base_url = url.trim().trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_temperature(mut self, temperature: f32) -> EvalResult<Self> {
        self.sampling.temperature = validate_range(temperature, 0.0, 1.0, "temperature")
            .map_err(|e| EvalError::Config(e.to_string()))?;
        Ok(self)
    }

    pub fn with_max_output_tokens(mut self, max_tokens: u32) -> EvalResult<Self> {
        if max_tokens == 0 {
            return Err(EvalError::Config("max output tokens must be greater than 0".into()));
        }
        self.sampling.max_output_tokens = max_tokens;
        Ok(self)
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> EvalResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EvalError::Config(format!("{} has an invalid value: {:?}", name, value)))
}
