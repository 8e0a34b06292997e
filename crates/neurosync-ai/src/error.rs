//! Error types for neurosync-ai

use thiserror::Error;

/// Result type alias using neurosync-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a completion exchange
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    /// No credential was configured for the exchange
    #[error("API key not configured")]
    MissingApiKey,

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is the missing-credential state rather than a
    /// transport or API failure
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::MissingApiKey)
    }
}
