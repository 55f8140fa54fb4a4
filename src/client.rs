// Oracle client implementation

use crate::builder::MessageBuilder;
use crate::config::EvalConfig;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client as HttpClient, header};
use std::sync::Arc;
use std::time::Duration;

/// Default base URL of the Anthropic Messages API
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Sampling parameters sent with every classification prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 200,
        }
    }
}

/// A text-completion service used as the sentiment oracle.
///
/// Implementations return the raw completion text. They make no promise
/// about its shape; callers validate it.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send a single prompt and return the completion text
    async fn complete(&self, prompt: &str, sampling: &SamplingConfig) -> EvalResult<String>;
}

/// HTTP oracle backed by the Anthropic Messages API
#[derive(Clone)]
pub struct OracleClient {
    pub(crate) http_client: HttpClient,
    pub(crate) api_key: SecureApiKey,
    pub base_url: String,
    pub model: ClaudeModel,
}

impl OracleClient {
    /// Create a client with the default model, base URL and a 60 second timeout
    pub fn new(api_key: impl Into<String>) -> EvalResult<Self> {
        Self::with_timeout(api_key, Duration::from_secs(60))
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> EvalResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EvalError::MissingApiKey {
                location: Some(concat!(file!(), ":", line!()).to_string()),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
            .map_err(|e| EvalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: SecureApiKey::new(api_key),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: ClaudeModel::default(),
        })
    }

    /// Build a client from a loaded configuration
    pub fn from_config(config: &EvalConfig) -> EvalResult<Self> {
        Ok(Self::with_timeout(config.api_key.as_str(), config.request_timeout)?
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone()))
    }

    /// Set the model used for requests
    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        self.model = model;
        self
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create a message builder bound to this client
    pub fn message(&self) -> MessageBuilder {
        MessageBuilder::from_client(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn complete(&self, prompt: &str, sampling: &SamplingConfig) -> EvalResult<String> {
        let response = self
            .message()
            .user_message(prompt)?
            .temperature(sampling.temperature)?
            .max_tokens(sampling.max_output_tokens)?
            .send()
            .await?;

        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "oracle call completed"
        );

        response
            .text()
            .ok_or_else(|| crate::oracle_unavailable!("No text content in oracle response"))
    }
}
