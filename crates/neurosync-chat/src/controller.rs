//! Conversation controller: the submission state machine

use std::sync::Arc;

use neurosync_ai::Message;
use tokio::sync::broadcast;

use crate::conversation::{Conversation, Phase};
use crate::events::ChatEvent;
use crate::exchange::Exchange;

/// Bubble text substituted when an exchange fails
pub const EXCHANGE_ERROR_TEXT: &str = "CONNECTION INTERRUPTED. CHECK CONSOLE.";

/// Bubble text substituted when no API credential is configured
pub const CONFIG_ERROR_TEXT: &str = "CRITICAL ERROR: GROQ_API_KEY NOT DETECTED.";

/// The conversation controller.
///
/// Owns the message sequence and the two-state phase machine. The exchange is
/// injected at construction. Failures never escape `submit`: every failure is
/// substituted with a fixed assistant bubble so the app stays interactive.
/// `submit` takes `&mut self`, so at most one exchange is ever in flight.
pub struct Controller {
    conversation: Conversation,
    exchange: Arc<dyn Exchange>,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl Controller {
    /// Create a controller with an injected exchange
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            conversation: Conversation::default(),
            exchange,
            event_tx,
        }
    }

    /// Create a controller restored from a saved message sequence
    pub fn with_history(exchange: Arc<dyn Exchange>, messages: Vec<Message>) -> Self {
        let mut controller = Self::new(exchange);
        controller.conversation = Conversation::from_messages(messages);
        controller
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current message sequence
    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    /// Get the current phase
    pub fn phase(&self) -> Phase {
        self.conversation.phase
    }

    /// Replace the message sequence (used when the slot is reset)
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.conversation.messages = messages;
        self.emit_history();
    }

    /// Check the submission guards without changing state: whitespace-only
    /// input and input during an in-flight exchange are both ignored.
    pub fn submission_allowed(&self, input: &str) -> bool {
        !input.trim().is_empty() && self.conversation.phase == Phase::Idle
    }

    /// Run one full submission: append the user turn, run the exchange,
    /// append the reply or the fixed error bubble, return to idle.
    ///
    /// The submitted text is appended exactly as typed; only the guard trims.
    pub async fn submit(&mut self, input: &str) {
        if !self.submission_allowed(input) {
            return;
        }

        self.conversation.phase = Phase::AwaitingReply;
        self.emit(ChatEvent::TurnStarted);

        let history = self.conversation.messages.clone();
        let user_message = Message::user(input);
        self.conversation.messages.push(user_message.clone());
        self.emit_history();

        match self.exchange.exchange(&history, &user_message).await {
            Ok(reply) => {
                self.conversation.messages.push(reply.clone());
                self.emit_history();
                self.emit(ChatEvent::ReplyReceived { message: reply });
            }
            Err(e) => {
                tracing::error!("exchange failed: {e}");
                let text = if e.is_missing_credential() {
                    CONFIG_ERROR_TEXT
                } else {
                    EXCHANGE_ERROR_TEXT
                };
                self.conversation.messages.push(Message::assistant(text));
                self.emit_history();
            }
        }

        self.conversation.phase = Phase::Idle;
        self.emit(ChatEvent::TurnEnded);
    }

    fn emit(&self, event: ChatEvent) {
        // Nobody listening is fine; persistence and UI attach when they care
        let _ = self.event_tx.send(event);
    }

    fn emit_history(&self) {
        self.emit(ChatEvent::HistoryChanged {
            messages: self.conversation.messages.clone(),
        });
    }
}
