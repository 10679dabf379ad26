//! Error types for the backend client.

use thiserror::Error;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, reset, body read).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Base URL or endpoint could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A JSON body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The bounded wait elapsed before the backend answered.
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// True when the backend was reached but refused the request.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Convenience result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
