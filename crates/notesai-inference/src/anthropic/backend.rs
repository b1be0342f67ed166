//! Anthropic messages backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use notesai_core::{defaults, Error, Result};

use super::types::*;
use crate::backend::GenerationBackend;
use crate::http::send_json;
use crate::openai::ChatMessage;

/// Default messages endpoint.
pub const DEFAULT_ANTHROPIC_URL: &str = defaults::ANTHROPIC_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::ANTHROPIC_MODEL;

/// Configuration for the messages backend.
#[derive(Clone)]
pub struct AnthropicConfig {
    pub provider: String,
    pub endpoint_url: String,
    pub api_key: String,
    pub gen_model: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("provider", &self.provider)
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"<redacted>")
            .field("gen_model", &self.gen_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            endpoint_url: DEFAULT_ANTHROPIC_URL.to_string(),
            api_key: String::new(),
            gen_model: DEFAULT_GEN_MODEL.to_string(),
            max_tokens: defaults::ANTHROPIC_MAX_TOKENS,
        }
    }
}

/// Messages API inference backend.
pub struct AnthropicBackend {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicBackend {
    pub fn new(client: Client, config: AnthropicConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        self.client
            .post(&self.config.endpoint_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "anthropic", op = "generate", model = %self.config.gen_model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: self.config.gen_model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage::user(prompt)],
        };

        let result: MessagesResponse =
            send_json(&self.config.provider, self.build_request().json(&request)).await?;

        let text = result
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                Error::Inference(format!("{} returned no text content", self.config.provider))
            })?;

        let text = text.trim().to_string();
        debug!(response_len = text.len(), "Messages generation complete");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        &self.config.provider
    }

    fn model_name(&self) -> &str {
        &self.config.gen_model
    }
}
