use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use ae_core::{ContentGenerator, Error, Generation, GenerationRequest, Result};
use std::fmt;
use tracing::debug;
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Deserialize)]
struct TokenUsage {
    total_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat-completions client. The caller's credential is sent per request and never kept.
pub struct OpenAIGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAIGenerator {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: super::base_url(config.base_url.as_deref(), DEFAULT_BASE_URL)?,
            model: config.model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl fmt::Debug for OpenAIGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIGenerator")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ContentGenerator for OpenAIGenerator {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(request.credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generator(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::Generator(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("{}: {}", status, text));
            return Err(Error::Generator(message));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Generator(format!("Unexpected completion response: {}", e)))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generator("Completion returned no choices".to_string()))?;

        debug!(model = %self.model, tokens = parsed.usage.total_tokens, "completion finished");
        Ok(Generation {
            text: choice.message.content,
            total_tokens: parsed.usage.total_tokens,
        })
    }
}
