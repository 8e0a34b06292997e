//! Error types for neurosync-chat

use thiserror::Error;

/// Result type alias using neurosync-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the conversation runtime
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the completion-exchange layer
    #[error(transparent)]
    Ai(#[from] neurosync_ai::Error),

    /// Filesystem access to the durable slot failed
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// History (de)serialization failed
    #[error("history serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
