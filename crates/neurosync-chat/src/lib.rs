//! neurosync-chat: Conversation runtime for NEURAL_SYNC_X
//!
//! This crate owns the conversational core: the controller state machine,
//! the durable history store, the media directive parser, and the voice
//! adapters around platform speech programs.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod events;
pub mod exchange;
pub mod media;
pub mod store;
pub mod voice;

pub use controller::{CONFIG_ERROR_TEXT, Controller, EXCHANGE_ERROR_TEXT};
pub use conversation::{Conversation, Phase};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use exchange::{ApiExchange, Exchange, SYSTEM_PROMPT};
pub use media::{ImageRef, MEDIA_MARKER};
pub use store::{HistoryStore, SEED_BANNER, seed_history};
pub use voice::{Recognizer, Speaker, VoiceState};
