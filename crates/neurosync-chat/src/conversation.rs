//! Conversation state: the message sequence and the controller phase.

use neurosync_ai::Message;

/// Controller phase. Exactly two states: either the controller is waiting for
/// operator input, or one exchange is in flight and resubmission is gated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingReply,
}

/// Conversation state owned by the controller.
///
/// The message sequence is append-only: turns are never edited or removed
/// once added, and order is conversation order.
#[derive(Default)]
pub struct Conversation {
    /// Conversation messages, oldest first
    pub messages: Vec<Message>,
    /// Current controller phase
    pub phase: Phase,
}

impl Conversation {
    /// Create a conversation restored from a saved sequence
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            phase: Phase::Idle,
        }
    }
}
