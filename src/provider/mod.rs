//! Model providers
//! The inference boundary is deliberately opaque: a conversation history
//! goes in, reply text comes out. Selection follows the first configured
//! credential in a fixed priority order.

pub mod anthropic;
pub mod openai_compat;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;

use async_trait::async_trait;

use crate::session::MessageEvent;
use crate::settings::Settings;

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce the assistant reply for the conversation so far.
    async fn complete(&self, history: &[MessageEvent]) -> anyhow::Result<String>;
}

/// Pick a provider for the first configured credential: anthropic, then
/// openai, then openrouter. `None` when no model credential is set.
pub fn from_settings(settings: &Settings) -> Option<Box<dyn Provider>> {
    if !settings.anthropic_api_key.is_empty() {
        return Some(Box::new(AnthropicProvider::new(
            settings.anthropic_api_key.clone(),
        )));
    }
    if !settings.openai_api_key.is_empty() {
        return Some(Box::new(OpenAiCompatProvider::openai(
            settings.openai_api_key.clone(),
        )));
    }
    if !settings.openrouter_api_key.is_empty() {
        return Some(Box::new(OpenAiCompatProvider::openrouter(
            settings.openrouter_api_key.clone(),
        )));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_follows_priority_order() {
        let mut settings = Settings::default();
        assert!(from_settings(&settings).is_none());

        settings.openrouter_api_key = "sk-or".into();
        assert_eq!(from_settings(&settings).unwrap().name(), "openrouter");

        settings.openai_api_key = "sk-oai".into();
        assert_eq!(from_settings(&settings).unwrap().name(), "openai");

        settings.anthropic_api_key = "sk-ant".into();
        assert_eq!(from_settings(&settings).unwrap().name(), "anthropic");
    }

    #[test]
    fn tavily_alone_selects_nothing() {
        let mut settings = Settings::default();
        settings.tavily_api_key = "tvly".into();
        assert!(from_settings(&settings).is_none());
    }
}
