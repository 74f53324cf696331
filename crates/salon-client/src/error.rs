//! Error types for the backend client

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection or transport failure
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Session missing or expired beyond refresh
    #[error("Not authenticated: {message}")]
    Unauthorized {
        /// Reason reported by the backend or the session
        message: String,
    },

    /// The backend returned 404
    #[error("Not found: {path}")]
    NotFound {
        /// Request path
        path: String,
    },

    /// Any other non-success response
    #[error("Backend returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `message` or `detail` from the body, or the status reason
        message: String,
    },

    /// The body could not be decoded into the expected type
    #[error("Invalid response body: {message}")]
    InvalidResponse {
        /// Decoding failure
        message: String,
    },

    /// A payload failed validation before it was sent
    #[error("Validation failed: {message}")]
    Validation {
        /// Failing field and reason
        message: String,
    },

    /// Client construction failed
    #[error("Invalid client configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised by the core crate
    #[error(transparent)]
    Core(#[from] salon_core::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            Self::Network(err)
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation(salon_core::Error::from(errors).to_string())
    }
}

/// Error body shapes the backend sends
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    messages: Vec<TokenMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenMessage {
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, falling back to an empty one
    pub(crate) fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Whether a 401 body says the access token expired
    pub(crate) fn is_token_expired(&self) -> bool {
        const INVALID_TOKEN: &str = "Given token not valid for any token type";
        const INVALID_CODE: &str = "token_not_valid";

        self.detail
            .as_deref()
            .is_some_and(|detail| detail == INVALID_TOKEN || detail == INVALID_CODE)
            || self.code.as_deref() == Some(INVALID_CODE)
            || self
                .messages
                .iter()
                .any(|m| m.message.as_deref() == Some("Token is expired"))
    }

    fn into_message(self) -> Option<String> {
        self.message.or(self.detail)
    }
}

impl ClientError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Map a non-success response to an error
    pub(crate) fn from_response(status: StatusCode, path: &str, body: &[u8]) -> Self {
        let message = ErrorBody::parse(body).into_message();
        match status {
            StatusCode::UNAUTHORIZED => Self::unauthorized(
                message.unwrap_or_else(|| "authentication required".to_string()),
            ),
            StatusCode::NOT_FOUND => Self::NotFound {
                path: path.to_string(),
            },
            _ => Self::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                }),
            },
        }
    }

    /// HTTP status behind the error, when there is one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the operator must sign in again
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
