//! Provider registry with provider-qualified slug routing.
//!
//! The registry holds a fixed table of providers, each with its endpoint,
//! current model and wire shape, plus the name of the active provider.
//! Model slugs can be provider-qualified:
//!
//! ```text
//! "mistral"                        → active provider
//! "ollama:llama2"                  → explicit local provider
//! "openai:gpt-3.5-turbo"           → OpenAI
//! "anthropic:claude-3-haiku-20240307" → Anthropic
//! ```
//!
//! Requests never read the registry directly. Callers take a
//! [`ProviderSnapshot`] at submission time and resolve a backend from it,
//! so later `set_model` calls never affect requests already in flight.

use std::collections::BTreeMap;

use reqwest::Client;
use tracing::{debug, info};

use notesai_core::{defaults, AppConfig, Error, ProviderDescriptor, ProviderKind, Result};

use crate::anthropic::{AnthropicBackend, AnthropicConfig};
use crate::backend::GenerationBackend;
use crate::ollama::OllamaBackend;
use crate::openai::{OpenAIBackend, OpenAIConfig};

/// Models offered by the model picker, as `(provider, model)`.
pub const SUGGESTED_MODELS: &[(&str, &str)] = &[
    ("ollama", "mistral"),
    ("ollama", "llama2"),
    ("ollama", "gemma"),
    ("ollama", "phi"),
    ("openai", defaults::OPENAI_MODEL),
    ("anthropic", defaults::ANTHROPIC_MODEL),
];

/// The model picker entries.
pub fn suggested_models() -> &'static [(&'static str, &'static str)] {
    SUGGESTED_MODELS
}

// ---------------------------------------------------------------------------
// Slug parsing
// ---------------------------------------------------------------------------

/// Result of parsing a provider-qualified model slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSlug {
    /// Provider name, `None` for a bare slug.
    pub provider: Option<String>,
    /// Model name with any provider prefix stripped.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Provider, model and credential captured when a request is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSnapshot {
    pub name: String,
    pub endpoint_url: String,
    pub model: String,
    pub kind: ProviderKind,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSnapshot")
            .field("name", &self.name)
            .field("endpoint_url", &self.endpoint_url)
            .field("model", &self.model)
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Known providers plus the active selection.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderDescriptor>,
    active: String,
}

impl ProviderRegistry {
    /// The three built-in providers with their default endpoints and models.
    /// The local provider is active.
    pub fn builtin() -> Self {
        let providers = builtin_descriptors(
            defaults::OLLAMA_URL,
            defaults::OPENAI_URL,
            defaults::ANTHROPIC_URL,
        );
        Self {
            providers: providers.into_iter().map(|d| (d.name.clone(), d)).collect(),
            active: defaults::PROVIDER.to_string(),
        }
    }

    /// Built-in providers with endpoints and the initial provider taken
    /// from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let descriptors = builtin_descriptors(
            &config.ollama_url,
            &config.openai_url,
            &config.anthropic_url,
        );
        let registry = Self::with_providers(descriptors, &config.provider)?;
        info!(
            subsystem = "inference",
            provider = %registry.active,
            model = %registry.active_model(),
            "Provider registry initialized"
        );
        Ok(registry)
    }

    /// A registry over an explicit provider table.
    pub fn with_providers(
        descriptors: impl IntoIterator<Item = ProviderDescriptor>,
        active: &str,
    ) -> Result<Self> {
        let providers: BTreeMap<String, ProviderDescriptor> = descriptors
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        if !providers.contains_key(active) {
            return Err(Error::UnsupportedProvider(active.to_string()));
        }
        Ok(Self {
            providers,
            active: active.to_string(),
        })
    }

    /// Switch to `provider` (when given) and set the active provider's model.
    ///
    /// An unknown provider fails with [`Error::UnsupportedProvider`] and
    /// leaves the registry untouched. The previous model of the provider is
    /// overwritten.
    pub fn set_model(&mut self, model: &str, provider: Option<&str>) -> Result<()> {
        let target = provider.unwrap_or(&self.active).to_string();
        let descriptor = self
            .providers
            .get_mut(&target)
            .ok_or_else(|| Error::UnsupportedProvider(target.clone()))?;
        descriptor.model = model.to_string();
        self.active = target;
        info!(
            subsystem = "inference",
            provider = %self.active,
            model,
            "Active model changed"
        );
        Ok(())
    }

    /// Make `provider` active without touching any model.
    ///
    /// The provider keeps whatever model it was last given. An unknown
    /// provider fails with [`Error::UnsupportedProvider`] and leaves the
    /// registry untouched.
    pub fn set_provider(&mut self, provider: &str) -> Result<()> {
        if !self.providers.contains_key(provider) {
            return Err(Error::UnsupportedProvider(provider.to_string()));
        }
        self.active = provider.to_string();
        info!(
            subsystem = "inference",
            provider = %self.active,
            model = %self.active_model(),
            "Active provider changed"
        );
        Ok(())
    }

    /// Apply a `provider:model` or bare slug.
    ///
    /// A known provider prefix with nothing after the colon is rejected
    /// with [`Error::Config`].
    pub fn set_model_slug(&mut self, slug: &str) -> Result<()> {
        if let Some(name) = slug.strip_suffix(':') {
            if self.providers.contains_key(name) {
                return Err(Error::Config(format!(
                    "Model slug '{}' names no model",
                    slug
                )));
            }
        }
        let parsed = self.parse_slug(slug);
        self.set_model(&parsed.model, parsed.provider.as_deref())
    }

    /// Split a slug into provider and model.
    ///
    /// Only known provider names count as prefixes, so model names that
    /// contain a colon (`llama2:13b`) stay bare.
    pub fn parse_slug(&self, slug: &str) -> ParsedSlug {
        for name in self.providers.keys() {
            if let Some(model) = slug.strip_prefix(name.as_str()).and_then(|s| s.strip_prefix(':')) {
                if !model.is_empty() {
                    debug!(slug, provider = %name, model, "Parsed provider-qualified slug");
                    return ParsedSlug {
                        provider: Some(name.clone()),
                        model: model.to_string(),
                    };
                }
            }
        }
        ParsedSlug {
            provider: None,
            model: slug.to_string(),
        }
    }

    /// Model of the active provider.
    pub fn active_model(&self) -> &str {
        self.providers
            .get(&self.active)
            .map(|d| d.model.as_str())
            .unwrap_or_default()
    }

    pub fn active_provider(&self) -> &str {
        &self.active
    }

    pub fn active_descriptor(&self) -> Option<&ProviderDescriptor> {
        self.providers.get(&self.active)
    }

    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(name)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Capture the active provider together with `api_key`.
    pub fn snapshot(&self, api_key: Option<&str>) -> ProviderSnapshot {
        let descriptor = self.active_descriptor();
        ProviderSnapshot {
            name: self.active.clone(),
            endpoint_url: descriptor
                .map(|d| d.endpoint_url.clone())
                .unwrap_or_default(),
            model: self.active_model().to_string(),
            kind: descriptor.map(|d| d.kind).unwrap_or(ProviderKind::Local),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_descriptors(
    ollama_url: &str,
    openai_url: &str,
    anthropic_url: &str,
) -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new("ollama", ollama_url, defaults::OLLAMA_MODEL, ProviderKind::Local),
        ProviderDescriptor::new(
            "openai",
            openai_url,
            defaults::OPENAI_MODEL,
            ProviderKind::ChatCompletion,
        ),
        ProviderDescriptor::new(
            "anthropic",
            anthropic_url,
            defaults::ANTHROPIC_MODEL,
            ProviderKind::Messages,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Backend resolution
// ---------------------------------------------------------------------------

/// Build the generation backend for a snapshot.
///
/// Cloud providers without a credential fail with
/// [`Error::MissingCredential`] before any request is built.
pub fn resolve_backend(
    snapshot: &ProviderSnapshot,
    client: Client,
) -> Result<Box<dyn GenerationBackend>> {
    let api_key = if snapshot.kind.requires_credential() {
        snapshot
            .api_key
            .clone()
            .ok_or_else(|| Error::MissingCredential(snapshot.name.clone()))?
    } else {
        String::new()
    };

    let backend: Box<dyn GenerationBackend> = match snapshot.kind {
        ProviderKind::Local => Box::new(OllamaBackend::new(
            client,
            &snapshot.name,
            &snapshot.endpoint_url,
            &snapshot.model,
        )),
        ProviderKind::ChatCompletion => Box::new(OpenAIBackend::new(
            client,
            OpenAIConfig {
                provider: snapshot.name.clone(),
                endpoint_url: snapshot.endpoint_url.clone(),
                api_key,
                gen_model: snapshot.model.clone(),
            },
        )),
        ProviderKind::Messages => Box::new(AnthropicBackend::new(
            client,
            AnthropicConfig {
                provider: snapshot.name.clone(),
                endpoint_url: snapshot.endpoint_url.clone(),
                api_key,
                gen_model: snapshot.model.clone(),
                max_tokens: defaults::ANTHROPIC_MAX_TOKENS,
            },
        )),
    };
    Ok(backend)
}
