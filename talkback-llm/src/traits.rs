use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of one message unit in a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Fixed sampling knobs sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub max_tokens: u32,
    pub stop: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            frequency_penalty: 0.5,
            presence_penalty: 0.5,
            max_tokens: 1024,
            stop: "\n\n".to_string(),
        }
    }
}

/// What the provider answered for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Text of the first choice.
    Completed(String),
    /// The provider throttled the request (HTTP 429).
    RateLimited,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Http(#[from] talkback_http::HttpError),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response contained no choices")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A chat-completion provider.
///
/// Implementations send exactly one request per call and never retry, so a
/// caller issuing calls one after another controls the request rate.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit one batch of messages and wait for the provider's answer.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionOutcome, LlmError>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
