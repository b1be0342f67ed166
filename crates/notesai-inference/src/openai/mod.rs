//! OpenAI chat-completion backend.
//!
//! Speaks the `/v1/chat/completions` request shape with bearer
//! authentication. Any endpoint accepting that shape works.
//!
//! # Example
//!
//! ```rust,no_run
//! use notesai_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use notesai_inference::{build_client, GenerationBackend};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         api_key: "sk-...".to_string(),
//!         ..OpenAIConfig::default()
//!     };
//!     let client = build_client(Duration::from_secs(120)).unwrap();
//!     let backend = OpenAIBackend::new(client, config);
//!     let text = backend.generate("Hello").await.unwrap();
//!     println!("{text}");
//! }
//! ```

mod backend;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL};
pub use types::*;
