//! Local Ollama generation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use notesai_core::Result;

use crate::backend::GenerationBackend;
use crate::http::send_json;

/// Request body for the generate endpoint.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// Non-streaming generate response.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Backend for a local Ollama server. No credential is sent.
pub struct OllamaBackend {
    client: Client,
    provider: String,
    endpoint_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(
        client: Client,
        provider: impl Into<String>,
        endpoint_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            endpoint_url: endpoint_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "ollama", op = "generate", model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let request = self.client.post(&self.endpoint_url).json(&body);

        let result: GenerateResponse = send_json(&self.provider, request).await?;
        let text = result.response.trim().to_string();
        debug!(response_len = text.len(), "Local generation complete");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
