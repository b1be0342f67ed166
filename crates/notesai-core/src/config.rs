//! Application configuration loaded from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::defaults;

/// Runtime configuration shared by the store, the provider layer, and the
/// dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `notes.json`, `prompts.json`, and `config.json`.
    pub data_dir: PathBuf,
    /// Timeout applied to each provider request.
    pub request_timeout_secs: u64,
    /// Upper bound on provider requests in flight.
    pub max_concurrent: usize,
    /// Provider active at startup.
    pub provider: String,
    pub ollama_url: String,
    pub openai_url: String,
    pub anthropic_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            max_concurrent: defaults::MAX_CONCURRENT_REQUESTS,
            provider: defaults::PROVIDER.to_string(),
            ollama_url: defaults::OLLAMA_URL.to_string(),
            openai_url: defaults::OPENAI_URL.to_string(),
            anthropic_url: defaults::ANTHROPIC_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `NOTESAI_HOME` | `~/NotesAI` | Data directory |
    /// | `NOTESAI_REQUEST_TIMEOUT_SECS` | `120` | Provider request timeout |
    /// | `NOTESAI_MAX_CONCURRENT` | `4` | Max provider requests in flight |
    /// | `NOTESAI_PROVIDER` | `ollama` | Provider active at startup |
    /// | `NOTESAI_OLLAMA_URL` | `http://localhost:11434/api/generate` | Local endpoint |
    /// | `NOTESAI_OPENAI_URL` | `https://api.openai.com/v1/chat/completions` | OpenAI endpoint |
    /// | `NOTESAI_ANTHROPIC_URL` | `https://api.anthropic.com/v1/messages` | Anthropic endpoint |
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();

        let data_dir = lookup("NOTESAI_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(base.data_dir);

        let request_timeout_secs = lookup("NOTESAI_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(base.request_timeout_secs);

        let max_concurrent = lookup("NOTESAI_MAX_CONCURRENT")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(base.max_concurrent)
            .max(1);

        let config = Self {
            data_dir,
            request_timeout_secs,
            max_concurrent,
            provider: lookup("NOTESAI_PROVIDER").unwrap_or(base.provider),
            ollama_url: lookup("NOTESAI_OLLAMA_URL").unwrap_or(base.ollama_url),
            openai_url: lookup("NOTESAI_OPENAI_URL").unwrap_or(base.openai_url),
            anthropic_url: lookup("NOTESAI_ANTHROPIC_URL").unwrap_or(base.anthropic_url),
        };
        debug!(
            data_dir = %config.data_dir.display(),
            timeout_secs = config.request_timeout_secs,
            max_concurrent = config.max_concurrent,
            provider = %config.provider,
            "Loaded configuration"
        );
        config
    }

    /// Use a different data directory.
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(defaults::NOTES_FILE)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.data_dir.join(defaults::PROMPTS_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(defaults::CONFIG_FILE)
    }
}

/// `~/NotesAI`, or `./NotesAI` when no home directory is known.
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(defaults::DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(defaults::DATA_DIR_NAME))
}
