//! Centralized default constants for NotesAI.
//!
//! **This module is the single source of truth** for shared default values.
//! Other crates reference these constants instead of defining their own.

// =============================================================================
// STORAGE
// =============================================================================

/// Data directory name under the user's home directory.
pub const DATA_DIR_NAME: &str = "NotesAI";

/// Note collection document.
pub const NOTES_FILE: &str = "notes.json";

/// Prompt template document.
pub const PROMPTS_FILE: &str = "prompts.json";

/// Credential document.
pub const CONFIG_FILE: &str = "config.json";

// =============================================================================
// NOTES
// =============================================================================

/// Title given to a freshly created note.
pub const NOTE_TITLE: &str = "New Note";

/// Category given to a freshly created note.
pub const NOTE_CATEGORY: &str = "uncategorized";

/// Prefix of generated note ids.
pub const NOTE_ID_PREFIX: &str = "note_";

// =============================================================================
// PROMPTS
// =============================================================================

/// Placeholder substituted with note content when rendering a prompt.
pub const PROMPT_PLACEHOLDER: &str = "{content}";

// =============================================================================
// PROVIDERS
// =============================================================================

/// Local Ollama generate endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Default local model.
pub const OLLAMA_MODEL: &str = "mistral";

/// OpenAI chat completions endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default OpenAI model.
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Anthropic messages endpoint.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default Anthropic model.
pub const ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic requires an explicit output budget.
pub const ANTHROPIC_MAX_TOKENS: u32 = 4096;

/// Provider active at startup.
pub const PROVIDER: &str = "ollama";

// =============================================================================
// DISPATCH
// =============================================================================

/// Timeout for a single provider request (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Maximum provider requests in flight at once.
pub const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Generation slower than this is logged as slow (milliseconds).
pub const SLOW_GENERATION_MS: u64 = 30_000;

/// A categorization line with more tokens than this is treated as a sentence.
pub const CATEGORY_MAX_TOKENS: usize = 3;

/// Tokens kept when a categorization line is truncated.
pub const CATEGORY_KEEP_TOKENS: usize = 2;
