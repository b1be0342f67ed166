//! Provider API keys persisted in `config.json`.
//!
//! Keys are stored as `{provider}_api_key` entries, e.g.
//!
//! ```json
//! {
//!   "anthropic_api_key": "",
//!   "openai_api_key": "sk-..."
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use notesai_core::Result;

use crate::file_storage::{read_json, write_json_atomic};

/// Cloud providers that get an empty entry in a fresh `config.json`.
const SEEDED_PROVIDERS: [&str; 2] = ["openai", "anthropic"];

/// Credential key for `provider`.
pub fn credential_key(provider: &str) -> String {
    format!("{}_api_key", provider)
}

/// Provider credentials backed by `config.json`.
#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    keys: BTreeMap<String, String>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured: Vec<&str> = self
            .keys
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("configured", &configured)
            .finish()
    }
}

impl CredentialStore {
    /// Load credentials from `path`, creating the document with empty
    /// entries when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let keys = match read_json::<BTreeMap<String, String>>(&path) {
            Ok(Some(keys)) => keys,
            Ok(None) => {
                let keys: BTreeMap<String, String> = SEEDED_PROVIDERS
                    .iter()
                    .map(|p| (credential_key(p), String::new()))
                    .collect();
                write_json_atomic(&path, &keys)?;
                info!(path = %path.display(), "Wrote empty credential file");
                keys
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load credentials, starting empty");
                BTreeMap::new()
            }
        };
        Ok(Self { path, keys })
    }

    /// An in-memory store that persists to `path` on the next `set`.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            keys: BTreeMap::new(),
        }
    }

    /// The key for `provider`; empty keys count as absent.
    pub fn get(&self, provider: &str) -> Option<&str> {
        self.keys
            .get(&credential_key(provider))
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    /// Store the key for `provider` and persist the document.
    pub fn set(&mut self, provider: &str, api_key: &str) -> Result<()> {
        let mut next = self.keys.clone();
        next.insert(credential_key(provider), api_key.trim().to_string());
        write_json_atomic(&self.path, &next)?;
        self.keys = next;
        info!(provider, "Stored API key");
        Ok(())
    }
}
