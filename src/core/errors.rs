//! Custom error types for translation operations

use thiserror::Error;

/// Error reported by the Yandex.Translate API for a non-200 response
#[derive(Error, Debug, Clone)]
#[error(
    "got an error from Yandex API: HTTP {method} {status}, {}",
    describe(.code, .message)
)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Provider error code, when the body could be decoded
    pub code: Option<i64>,
    /// Provider error message, when the body could be decoded
    pub message: Option<String>,
    /// Method of the originating request
    pub method: String,
    /// URL of the originating request with the API key redacted
    pub url: String,
    /// Raw response body
    pub body: String,
}

impl ApiError {
    /// Provider message, or an empty string when the body was not decodable
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

fn describe(code: &Option<i64>, message: &Option<String>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!("{} {}", code, message),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => "no error details".to_string(),
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is missing or wrong
        message: String,
    },

    /// Language code could not be parsed
    #[error("invalid language tag {tag:?}: {reason}")]
    InvalidLanguage {
        /// Tag as given by the caller
        tag: String,
        /// Why the tag was rejected
        reason: String,
    },

    /// Request could not be built from the base URL and parameters
    #[error("Failed to build request: {message}")]
    RequestBuildError {
        /// URL parse failure
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    TransportError {
        /// Transport failure, without the request URL
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Non-200 response from the provider
    #[error(transparent)]
    ProviderError(#[from] ApiError),

    /// 200 response whose body is not the expected JSON
    #[error("error parsing JSON response: {message}")]
    DecodeError {
        /// JSON decoder message
        message: String,
    },

    /// 200 response with an empty `text` array
    #[error("got empty text array in JSON")]
    EmptyResultError,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_language(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLanguage {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Provider error details, if this is a provider error
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::ProviderError(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the failure happened on the wire rather than at the provider
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. } | Self::TimeoutError)
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
