//! Chat-completion integration for Talkback.
//!
//! This crate exposes the [`traits::CompletionClient`] interface used by the
//! batch summarizer and an OpenAI implementation. [`client_from_config`] turns
//! the loaded [`talkback_config::OpenAiConfig`] into a ready client.
//!
//! # Examples
//! ```no_run
//! use talkback_config::TalkbackConfigLoader;
//! use talkback_llm::client_from_config;
//!
//! let cfg = TalkbackConfigLoader::new().load().expect("config");
//! let client = client_from_config(&cfg.openai).expect("OPENAI_API_KEY set");
//! assert_eq!(client.model_name(), "gpt-3.5-turbo");
//! ```
pub mod openai;
pub mod traits;

use openai::OpenAiChatClient;
use std::sync::Arc;
use talkback_config::OpenAiConfig;
pub use traits::{
    ChatMessage, ChatRole, CompletionClient, CompletionOutcome, GenerationParams, LlmError,
};

/// Default model for comment summaries.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Build the completion client described by the configuration.
pub fn client_from_config(
    config: &OpenAiConfig,
) -> Result<Arc<dyn CompletionClient + Send + Sync + 'static>, LlmError> {
    let api_key = config
        .api_key()
        .ok_or_else(|| LlmError::Config("OpenAI API key is not configured".to_string()))?;
    let model = if config.model.trim().is_empty() {
        DEFAULT_OPENAI_MODEL.to_string()
    } else {
        config.model.clone()
    };
    let client = OpenAiChatClient::with_endpoint(&config.endpoint, api_key.to_string(), model)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let cfg = OpenAiConfig::default();
        assert!(matches!(client_from_config(&cfg), Err(LlmError::Config(_))));
    }

    #[test]
    fn blank_model_falls_back_to_default() {
        let cfg = OpenAiConfig {
            api_key: Some("sk-test".into()),
            model: " ".into(),
            ..OpenAiConfig::default()
        };
        let client = client_from_config(&cfg).unwrap();
        assert_eq!(client.model_name(), DEFAULT_OPENAI_MODEL);
    }
}
