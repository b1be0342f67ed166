//! OpenAI chat-completion backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use notesai_core::{defaults, Error, Result};

use super::types::*;
use crate::backend::GenerationBackend;
use crate::http::send_json;

/// Default chat completions endpoint.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::OPENAI_MODEL;

/// Configuration for the chat-completion backend.
#[derive(Clone)]
pub struct OpenAIConfig {
    /// Registry name used in errors and logs.
    pub provider: String,
    /// Full chat completions URL.
    pub endpoint_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model to use for generation.
    pub gen_model: String,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("provider", &self.provider)
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &"<redacted>")
            .field("gen_model", &self.gen_model)
            .finish()
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: String::new(),
            gen_model: DEFAULT_GEN_MODEL.to_string(),
        }
    }
}

/// Chat-completion inference backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    pub fn new(client: Client, config: OpenAIConfig) -> Self {
        Self { client, config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication.
    fn build_request(&self) -> reqwest::RequestBuilder {
        self.client
            .post(&self.config.endpoint_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "openai", op = "generate", model = %self.config.gen_model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.gen_model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        let result: ChatCompletionResponse =
            send_json(&self.config.provider, self.build_request().json(&request)).await?;

        let choice = result.choices.into_iter().next().ok_or_else(|| {
            Error::Inference(format!("{} returned no choices", self.config.provider))
        })?;

        let text = choice.message.content.trim().to_string();
        debug!(response_len = text.len(), "Chat completion complete");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        &self.config.provider
    }

    fn model_name(&self) -> &str {
        &self.config.gen_model
    }
}
