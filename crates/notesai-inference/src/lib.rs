//! # notesai-inference
//!
//! AI provider abstraction for NotesAI.
//!
//! This crate provides:
//! - [`ProviderRegistry`]: the fixed provider table and the active provider/model
//! - [`ProviderSnapshot`]: an immutable provider + model + credential capture
//! - The [`GenerationBackend`] trait and one backend per wire shape:
//!   [`OllamaBackend`] (local), [`OpenAIBackend`] (chat completions),
//!   [`AnthropicBackend`] (messages)
//! - Per-operation post-processing of generated text
//!
//! # Example
//!
//! ```rust,no_run
//! use notesai_inference::{build_client, resolve_backend, ProviderRegistry};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ProviderRegistry::builtin();
//!     let snapshot = registry.snapshot(None);
//!     let client = build_client(Duration::from_secs(60)).unwrap();
//!     let backend = resolve_backend(&snapshot, client).unwrap();
//!     let text = backend.generate("Say hello").await.unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod anthropic;
pub mod backend;
pub mod http;
pub mod ollama;
pub mod openai;
pub mod postprocess;
pub mod provider;

// Re-export core types
pub use notesai_core::*;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use backend::GenerationBackend;
pub use http::build_client;
pub use ollama::OllamaBackend;
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use postprocess::{normalize_category, postprocess};
pub use provider::{
    resolve_backend, suggested_models, ParsedSlug, ProviderRegistry, ProviderSnapshot,
};
