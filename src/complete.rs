use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CompletionConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Free-text completion used by the AI extraction tier. Optional: callers
/// must tolerate its absence and its failures.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for any OpenAI-compatible chat-completions endpoint.
pub struct HttpCompletionProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpCompletionProvider {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0,
        });

        let resp: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("Completion request failed")?
            .error_for_status()
            .context("Completion request rejected")?
            .json()
            .await
            .context("Failed to parse completion response")?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Completion response had no choices")
    }
}
