// Message Builder

use crate::client::OracleClient;
use crate::types::*;
use crate::utils::validate_range;

use std::sync::Arc;

/// Fallback cap when no max token count was set on the builder
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// A struct for building oracle requests with a fluent interface.
pub struct MessageBuilder {
    client: Arc<OracleClient>,
    model: ClaudeModel,
    messages: Vec<Message>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl MessageBuilder {
    pub(crate) fn from_client(client: Arc<OracleClient>) -> Self {
        Self {
            model: client.model.clone(),
            client,
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a user message; blank text is rejected
    pub fn user_message(mut self, text: impl Into<String>) -> EvalResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EvalError::ValidationError("User message cannot be empty".into()));
        }
        self.messages.push(Message {
            role: Role::User,
            content: vec![Content::Text { text }],
        });
        Ok(self)
    }

    /// Set the temperature parameter (between 0.0 and 1.0)
    ///
    /// Lower values make the oracle's output more deterministic.
    pub fn temperature(mut self, temperature: f32) -> EvalResult<Self> {
        self.temperature = Some(validate_range(temperature, 0.0, 1.0, "temperature")?);
        Ok(self)
    }

    /// Set the maximum number of tokens to generate
    pub fn max_tokens(mut self, max_tokens: u32) -> EvalResult<Self> {
        if max_tokens == 0 {
            return Err(EvalError::ValidationError("max_tokens must be greater than 0".into()));
        }
        self.max_tokens = Some(max_tokens);
        Ok(self)
    }

    fn build_request(&self) -> MessageRequest {
        MessageRequest {
            model: self.model.as_str().to_string(),
            messages: self.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }

    /// Map a non-success HTTP status to the matching error
    async fn handle_error_response(&self, response: reqwest::Response) -> EvalResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        if status == 429 {
            let retry_after = headers
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(std::time::Duration::from_secs);

            return Err(EvalError::rate_limited(retry_after));
        }

        let sanitized_error = sanitize_error_message(&error_text);

        Err(EvalError::api_error(sanitized_error, Some(status), Some(concat!(file!(), ":", line!()))))
    }

    /// Send the message and return the decoded response
    pub async fn send(self) -> EvalResult<MessageResponse> {
        if self.messages.is_empty() {
            return Err(EvalError::ValidationError(
                "At least one message is required".to_string()
            ));
        }

        let endpoint = format!("{}/messages", self.client.base_url);
        let request = self.build_request();

        let response = self.client.http_client
            .post(&endpoint)
            .header("x-api-key", self.client.api_key.as_str())
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        let response = self.handle_error_response(response).await?;

        response.json::<MessageResponse>().await.map_err(|e| {
            crate::oracle_unavailable!(format!("Failed to decode oracle response: {}", e), e)
        })
    }
}
