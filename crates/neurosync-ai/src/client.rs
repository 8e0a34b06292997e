//! Groq chat-completion client (OpenAI-compatible wire format)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Context, Message};

/// Model served by the exchange
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// OpenAI-compatible Groq endpoint
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable holding the API credential
pub const API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

/// Client for the chat-completions endpoint.
///
/// One request per exchange: system prompt plus the entire history goes out,
/// and the call suspends until the complete reply (or a failure) comes back.
/// No retry, no timeout, no streaming.
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl GroqClient {
    /// Create a new client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        }
    }

    /// Override the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Get the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one full request/response cycle against the completions endpoint
    pub async fn complete(&self, context: &Context) -> Result<Message> {
        let request = build_request(&self.model, self.temperature, context);
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), parse_error_message(&body)));
        }

        let completion: CompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedResponse("no choices in response".to_string()))?;

        Ok(Message::assistant(choice.message.content))
    }
}

/// A completion client that may lack a credential.
///
/// `complete` on the unconfigured variant fails with [`Error::MissingApiKey`],
/// which keeps the missing-credential state on the same failure path as
/// transport errors.
#[derive(Debug, Clone)]
pub enum CompletionClient {
    Ready(GroqClient),
    Unconfigured,
}

impl CompletionClient {
    /// Check whether a credential was configured
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Run one exchange, or fail with the missing-credential error
    pub async fn complete(&self, context: &Context) -> Result<Message> {
        match self {
            Self::Ready(client) => client.complete(context).await,
            Self::Unconfigured => Err(Error::MissingApiKey),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request(model: &str, temperature: Option<f32>, context: &Context) -> CompletionRequest {
    let mut messages = Vec::with_capacity(context.messages.len() + 1);

    // System prompt is always the first wire message
    if let Some(ref system_prompt) = context.system_prompt {
        messages.push(WireMessage {
            role: "system".to_string(),
            content: system_prompt.clone(),
        });
    }

    for message in &context.messages {
        messages.push(WireMessage {
            role: message.role().to_string(),
            content: message.content().to_string(),
        });
    }

    CompletionRequest {
        model: model.to_string(),
        messages,
        temperature,
    }
}

fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
