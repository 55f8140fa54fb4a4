// Core types and errors

use serde::{Deserialize, Serialize};
use thiserror::Error;
use std::time::Duration;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

/// The result type used throughout the crate
pub type EvalResult<T> = Result<T, EvalError>;

/// Convert reqwest::Error to our EvalError
///
/// Timeouts become `OracleTimeout`, every other transport failure is
/// `OracleUnavailable`.
impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return EvalError::OracleTimeout { location: None };
        }
        EvalError::OracleUnavailable {
            message: sanitize_error_message(&err.to_string()),
            location: None,
            source: Some(Arc::new(err) as Arc<dyn std::error::Error + Send + Sync>),
        }
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        EvalError::Io {
            message: err.to_string(),
            source: Some(Arc::new(err) as Arc<dyn std::error::Error + Send + Sync>),
        }
    }
}

impl From<csv::Error> for EvalError {
    fn from(err: csv::Error) -> Self {
        EvalError::Csv {
            message: err.to_string(),
            source: Some(Arc::new(err) as Arc<dyn std::error::Error + Send + Sync>),
        }
    }
}

/// Oracle API key; never printed, zeroed when the config or client holding it is dropped
pub struct SecureApiKey {
    key: String,
}

impl SecureApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The raw key, for the request header only
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl Deref for SecureApiKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl Drop for SecureApiKey {
    fn drop(&mut self) {
        // SAFETY: writing zero bytes keeps the buffer valid UTF-8
        unsafe {
            let bytes = self.key.as_bytes_mut();
            bytes.iter_mut().for_each(|b| *b = 0);
        }
    }
}

impl fmt::Debug for SecureApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureApiKey([REDACTED])")
    }
}

impl fmt::Display for SecureApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED API KEY]")
    }
}

impl Clone for SecureApiKey {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
        }
    }
}

/// Every failure the pipeline can observe.
///
/// Errors raised below the classifier boundary (`InvalidInput`,
/// `MalformedOracleOutput` and the oracle failures) are recovered into a
/// default classification and never reach batch callers. Structural misuse
/// (`ShapeMismatch`, `EmptyDataset`, ...) is returned to the caller.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed oracle output: {message}")]
    MalformedOracleOutput {
        message: String,
        raw: Option<String>,
        location: Option<String>,
    },

    #[error("Oracle unavailable: {message}")]
    OracleUnavailable {
        message: String,
        location: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Oracle request timed out")]
    OracleTimeout {
        location: Option<String>,
    },

    #[error("Rate limited by oracle: retry after {retry_after:?}")]
    RateLimited {
        retry_after: Option<Duration>,
    },

    #[error("Oracle returned error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
        location: Option<String>,
    },

    #[error("API key not provided")]
    MissingApiKey {
        location: Option<String>,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shape mismatch: {reviews} reviews but {outcomes} outcomes")]
    ShapeMismatch {
        reviews: usize,
        outcomes: usize,
    },

    #[error("Cannot compute metrics over an empty dataset")]
    EmptyDataset,

    #[error("Row {row} has no true label")]
    MissingTrueLabel {
        row: usize,
    },

    #[error("Invalid label {value:?} at row {row}")]
    InvalidLabel {
        value: String,
        row: usize,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("I/O error: {message}")]
    Io {
        message: String,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },

    #[error("CSV error: {message}")]
    Csv {
        message: String,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },
}

impl EvalError {
    pub fn malformed_output<T: Into<String>>(
        message: T,
        raw: Option<String>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::MalformedOracleOutput {
            message: message.into(),
            raw,
            location: location.map(String::from),
        };

        // Recovered by the classifier, so this is only a warning
        if let Some(loc) = error.location() {
            log::warn!("{} at {}", error, loc);
        } else {
            log::warn!("{}", error);
        }

        error
    }

    pub fn oracle_unavailable<T: Into<String>>(
        message: T,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::OracleUnavailable {
            message: message.into(),
            location: location.map(String::from),
            source: source.map(|e| Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>),
        };

        if let Some(loc) = error.location() {
            log::error!("{} at {}", error, loc);
        } else {
            log::error!("{}", error);
        }

        error
    }

    pub fn api_error<T: Into<String>>(
        message: T,
        status: Option<u16>,
        location: Option<&str>,
    ) -> Self {
        let error = Self::ApiError {
            message: message.into(),
            status: status.unwrap_or(500),
            location: location.map(String::from),
        };

        if let Some(loc) = error.location() {
            log::error!("{} at {}", error, loc);
        } else {
            log::error!("{}", error);
        }

        error
    }

    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn simple_oracle_unavailable<T: Into<String>>(message: T) -> Self {
        Self::oracle_unavailable(message, None::<reqwest::Error>, None)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::MalformedOracleOutput { location, .. } => location.as_deref(),
            Self::OracleUnavailable { location, .. } => location.as_deref(),
            Self::OracleTimeout { location } => location.as_deref(),
            Self::ApiError { location, .. } => location.as_deref(),
            Self::MissingApiKey { location } => location.as_deref(),
            _ => None,
        }
    }

    /// True for failures of the outbound oracle call itself
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            Self::OracleUnavailable { .. }
                | Self::OracleTimeout { .. }
                | Self::RateLimited { .. }
                | Self::ApiError { .. }
        )
    }
}

/// Create a malformed-output error that records where it was raised
#[macro_export]
macro_rules! malformed_output {
    ($message:expr) => {
        $crate::types::EvalError::malformed_output($message, None, Some(concat!(file!(), ":", line!())))
    };
    ($message:expr, $raw:expr) => {
        $crate::types::EvalError::malformed_output($message, Some($raw), Some(concat!(file!(), ":", line!())))
    };
}

/// Create an oracle-unavailable error that records where it was raised
#[macro_export]
macro_rules! oracle_unavailable {
    ($message:expr) => {
        $crate::types::EvalError::oracle_unavailable($message, None::<reqwest::Error>, Some(concat!(file!(), ":", line!())))
    };
    ($message:expr, $source:expr) => {
        $crate::types::EvalError::oracle_unavailable($message, Some($source), Some(concat!(file!(), ":", line!())))
    };
}

/// Claude model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaudeModel {
    #[serde(rename = "claude-3-haiku-20240307")]
    Haiku,
    #[serde(rename = "claude-3-5-haiku-20241022")]
    Haiku35,
    #[serde(rename = "claude-3-5-sonnet-20240620")]
    Sonnet35,
    #[serde(rename = "claude-3-7-sonnet-20250219")]
    Sonnet37,
    /// Use a custom model identifier
    Custom(String),
}

impl ClaudeModel {
    pub fn as_str(&self) -> &str {
        match self {
            ClaudeModel::Haiku => "claude-3-haiku-20240307",
            ClaudeModel::Haiku35 => "claude-3-5-haiku-20241022",
            ClaudeModel::Sonnet35 => "claude-3-5-sonnet-20240620",
            ClaudeModel::Sonnet37 => "claude-3-7-sonnet-20250219",
            ClaudeModel::Custom(id) => id,
        }
    }
}

impl Default for ClaudeModel {
    fn default() -> Self {
        ClaudeModel::Haiku
    }
}

impl FromStr for ClaudeModel {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if id.is_empty() {
            return Err(EvalError::Config("model identifier cannot be empty".into()));
        }
        Ok(match id {
            "claude-3-haiku-20240307" => ClaudeModel::Haiku,
            "claude-3-5-haiku-20241022" => ClaudeModel::Haiku35,
            "claude-3-5-sonnet-20240620" => ClaudeModel::Sonnet35,
            "claude-3-7-sonnet-20250219" => ClaudeModel::Sonnet37,
            other => ClaudeModel::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for ClaudeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
    /// Any non-text block (tool use, thinking, ...) the classifier ignores
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize, Clone)]
pub struct MessageRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessageResponse {
    pub id: String,
    pub model: String,
    pub r#type: String,
    pub role: Role,
    pub content: Vec<Content>,
    pub usage: Usage,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
}

impl MessageResponse {
    /// Concatenated text of every text block, `None` when there is none
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter_map(|block| match block {
                Content::Text { text } => Some(text.as_str()),
                Content::Other => None,
            })
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Remove anything that looks like a credential from an error message
pub fn sanitize_error_message(message: &str) -> String {
    lazy_static::lazy_static! {
        static ref API_KEY_PATTERN: regex::Regex =
            regex::Regex::new(r"[A-Za-z0-9_-]{20,}").expect("valid redaction pattern");
    }
    API_KEY_PATTERN.replace_all(message, "[REDACTED]").into_owned()
}
