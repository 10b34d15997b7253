//! Anthropic messages API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::Provider;
use crate::session::{MessageEvent, Role};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, history: &[MessageEvent]) -> Result<String> {
        let mut system = Vec::new();
        let mut messages = Vec::new();
        for event in history {
            match event.role {
                Role::System => system.push(event.content.as_str()),
                Role::User | Role::Tool => {
                    messages.push(json!({"role": "user", "content": event.content}));
                }
                Role::Assistant => {
                    messages.push(json!({"role": "assistant", "content": event.content}));
                }
            }
        }

        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": messages,
        });
        if !system.is_empty() {
            body["system"] = Value::String(system.join("\n\n"));
        }

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("request to Anthropic failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic returned {status}: {detail}");
        }

        let value: Value = response
            .json()
            .await
            .context("invalid response from Anthropic")?;
        let text = value["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("Anthropic response contained no text");
        }
        Ok(text)
    }
}
