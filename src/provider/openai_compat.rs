//! OpenAI-compatible chat completions client
//! Serves both OpenAI and OpenRouter, which share the wire shape.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::Provider;
use crate::session::{MessageEvent, Role};

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";

pub struct OpenAiCompatProvider {
    name: &'static str,
    base_url: &'static str,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            name: "openai",
            base_url: OPENAI_BASE,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            name: "openrouter",
            base_url: OPENROUTER_BASE,
            api_key: api_key.into(),
            model: "openrouter/auto".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, history: &[MessageEvent]) -> Result<String> {
        let messages: Vec<Value> = history
            .iter()
            .map(|event| {
                let role = match event.role {
                    Role::System => "system",
                    Role::User | Role::Tool => "user",
                    Role::Assistant => "assistant",
                };
                json!({"role": role, "content": event.content})
            })
            .collect();

        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.name))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {status}: {detail}", self.name);
        }

        let value: Value = response
            .json()
            .await
            .with_context(|| format!("invalid response from {}", self.name))?;
        let text = value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        if text.is_empty() {
            anyhow::bail!("{} response contained no text", self.name);
        }
        Ok(text)
    }
}
