//! Controller event types

use neurosync_ai::Message;
use serde::{Deserialize, Serialize};

/// Events emitted by the controller during a submission.
///
/// `HistoryChanged` carries a full snapshot of the message sequence; the
/// persistence subscriber rewrites the durable slot from it, so storage
/// follows every append without the controller knowing about storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A submission was accepted and an exchange is about to start
    TurnStarted,

    /// The message sequence changed (user append, reply append, error append)
    HistoryChanged { messages: Vec<Message> },

    /// A reply arrived from the exchange
    ReplyReceived { message: Message },

    /// The submission resolved, successfully or not
    TurnEnded,
}

impl ChatEvent {
    /// Check if this event closes a submission
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::TurnEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_tag() {
        let json = serde_json::to_value(ChatEvent::TurnStarted).unwrap();
        assert_eq!(json["type"], "turn_started");

        let event = ChatEvent::ReplyReceived {
            message: Message::assistant("ack"),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "reply_received");
        assert_eq!(json["message"]["role"], "assistant");
    }

    #[test]
    fn test_terminal_event() {
        assert!(ChatEvent::TurnEnded.is_terminal());
        assert!(!ChatEvent::TurnStarted.is_terminal());
    }
}
