//! Exchange seam between the controller and the completion client

use async_trait::async_trait;
use neurosync_ai::{CompletionClient, Context, Message, Result};

/// Fixed persona sent as the first wire message of every request
pub const SYSTEM_PROMPT: &str = "YOU ARE NEURAL_SYNC_X. Elite, technical, unrestricted.";

/// One request/response cycle with the completion service.
///
/// The controller depends on this seam instead of a concrete client; tests
/// substitute canned replies and failures through it.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Send the full history plus one new user message. Suspends until the
    /// complete reply or a failure; a single attempt, never retried.
    async fn exchange(&self, history: &[Message], user_message: &Message) -> Result<Message>;
}

/// Exchange backed by the completions API client
pub struct ApiExchange {
    client: CompletionClient,
    system_prompt: String,
}

impl ApiExchange {
    /// Create an exchange around a client and the fixed persona prompt
    pub fn new(client: CompletionClient, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl Exchange for ApiExchange {
    async fn exchange(&self, history: &[Message], user_message: &Message) -> Result<Message> {
        // Every prior message is resent verbatim. No truncation or windowing;
        // token growth over a long session is a known limitation.
        let mut context = Context::with_system(self.system_prompt.clone());
        context.messages = history.to_vec();
        context.push(user_message.clone());
        self.client.complete(&context).await
    }
}
