//! Anthropic messages backend.
//!
//! Sends `{model, max_tokens, messages}` to the messages endpoint with the
//! `x-api-key` and `anthropic-version` headers and reads `content[0].text`.

mod backend;
mod types;

pub use backend::{AnthropicBackend, AnthropicConfig, DEFAULT_ANTHROPIC_URL, DEFAULT_GEN_MODEL};
pub use types::*;
