//! API client errors.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or rejected credentials (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,

        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// An HTTP transport error occurred.
    #[error("http error")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("unexpected response body")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Build an error from a non-success status and its body.
    ///
    /// The backend reports failures as `{"error": "..."}`; anything else is
    /// passed through verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map_or_else(|_| body.trim().to_string(), |parsed| parsed.error);

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether retrying with fresh credentials could help.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
