use crate::traits::{ChatMessage, CompletionClient, CompletionOutcome, GenerationParams, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use talkback_http::{HttpClient, HttpError};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// Client for the OpenAI chat-completions endpoint.
pub struct OpenAiChatClient {
    client: HttpClient,
    api_key: String,
    model: String,
    params: GenerationParams,
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    params: &'a GenerationParams,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenAiChatClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Self::with_endpoint(OPENAI_API_BASE, api_key, model)
    }

    /// Create a client against an OpenAI-compatible endpoint (gateway, test server).
    pub fn with_endpoint(endpoint: &str, api_key: String, model: String) -> Result<Self, LlmError> {
        // `Url::join` drops the last segment unless the base ends with '/'
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let client = HttpClient::new(&base)?;

        Ok(Self {
            client,
            api_key,
            model,
            params: GenerationParams::default(),
        })
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionOutcome, LlmError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            params: &self.params,
            messages,
        };

        tracing::debug!(
            model = %self.model,
            message_count = messages.len(),
            "openai.chat.request"
        );

        let resp: ChatCompletionResponse = match self
            .client
            .post_json("chat/completions", Some(&self.api_key), &req)
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(model = %self.model, "openai.chat.rate_limited");
                return Ok(CompletionOutcome::RateLimited);
            }
            Err(e) => return Err(http_to_llm(e)),
        };

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(
            model = ?resp.model,
            response_id = ?resp.id,
            chars = text.len(),
            "openai.chat.completed"
        );
        Ok(CompletionOutcome::Completed(text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_llm(e: HttpError) -> LlmError {
    match e {
        HttpError::Api {
            status, message, ..
        } => LlmError::Api {
            status: status.as_u16(),
            message,
        },
        other => LlmError::Http(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_flattens_generation_params() {
        let params = GenerationParams::default();
        let messages = vec![ChatMessage::user("Odlično"), ChatMessage::assistant("Summarize")];
        let req = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            params: &params,
            messages: &messages,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["stop"], "\n\n");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Summarize");
    }

    #[test]
    fn endpoint_without_trailing_slash_is_normalised() {
        let client =
            OpenAiChatClient::with_endpoint("https://api.openai.com/v1", "sk".into(), "m".into())
                .unwrap();
        assert_eq!(client.client.base().as_str(), "https://api.openai.com/v1/");
    }
}
