//! neurosync-ai: Groq chat-completion client for NEURAL_SYNC_X
//!
//! One provider, one non-streamed exchange: the full conversation goes out,
//! a single complete assistant message comes back.

pub mod client;
pub mod error;
pub mod types;

pub use client::{API_KEY_ENV_VAR, CompletionClient, DEFAULT_MODEL, GROQ_BASE_URL, GroqClient};
pub use error::{Error, Result};
pub use types::*;
