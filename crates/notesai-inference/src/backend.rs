//! Generation backend trait.

use async_trait::async_trait;

use notesai_core::Result;

/// A provider that turns a prompt into generated text.
///
/// Implementations return the extracted text already trimmed. Non-success
/// HTTP statuses surface as [`notesai_core::Error::Provider`] carrying the
/// status code and raw body.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Registry name of the provider behind this backend.
    fn provider_name(&self) -> &str;

    /// Model the backend sends requests for.
    fn model_name(&self) -> &str;
}
