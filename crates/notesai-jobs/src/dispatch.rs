//! AI dispatch engine: runs note operations against the active provider in
//! the background and reports each outcome through a callback.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, error, info, warn};

use notesai_core::{defaults, AppConfig, Error, Operation, ResultEnvelope, Result};
use notesai_inference::{
    build_client, postprocess, resolve_backend, GenerationBackend, ProviderRegistry,
    ProviderSnapshot,
};
use notesai_store::prompts::render_template;
use notesai_store::{CredentialStore, PromptCatalog, PromptTemplates};

/// Builds the backend for a captured provider snapshot.
pub type BackendResolver =
    Arc<dyn Fn(&ProviderSnapshot, Client) -> Result<Box<dyn GenerationBackend>> + Send + Sync>;

/// Configuration for the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum number of provider requests in flight.
    pub max_concurrent: usize,
    /// Timeout applied to each provider request.
    pub request_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::MAX_CONCURRENT_REQUESTS,
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl DispatchConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `NOTESAI_MAX_CONCURRENT` | `4` | Max provider requests in flight |
    /// | `NOTESAI_REQUEST_TIMEOUT_SECS` | `120` | Provider request timeout |
    pub fn from_env() -> Self {
        Self::from(&AppConfig::from_env())
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl From<&AppConfig> for DispatchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent.max(1),
            request_timeout: config.request_timeout(),
        }
    }
}

/// Mutable configuration shared between the engine and its callers.
#[derive(Debug)]
pub struct EngineState {
    pub registry: ProviderRegistry,
    pub credentials: CredentialStore,
    pub prompts: PromptCatalog,
}

impl EngineState {
    /// Load the registry, credentials and prompt catalog for `config`.
    pub fn load(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            registry: ProviderRegistry::from_config(config)?,
            credentials: CredentialStore::load(config.credentials_path())?,
            prompts: PromptCatalog::load(config.prompts_path())?,
        })
    }
}

/// Everything a background request needs, captured at submission time.
struct DispatchRequest {
    content: String,
    operation: String,
    templates: PromptTemplates,
    provider: ProviderSnapshot,
}

/// Background AI dispatcher.
///
/// Each [`process`](Self::process) call captures the active provider, its
/// model, its credential and the prompt templates, then runs the request on
/// the runtime. Configuration changes only affect later submissions.
pub struct DispatchEngine {
    registry: RwLock<ProviderRegistry>,
    credentials: RwLock<CredentialStore>,
    prompts: RwLock<PromptCatalog>,
    client: Client,
    runtime: Handle,
    permits: Arc<Semaphore>,
    resolver: BackendResolver,
    config: DispatchConfig,
}

impl DispatchEngine {
    /// Create an engine that spawns its requests on `runtime`.
    pub fn new(state: EngineState, config: DispatchConfig, runtime: Handle) -> Result<Self> {
        let client = build_client(config.request_timeout)?;
        let max_concurrent = config.max_concurrent.max(1);

        info!(
            subsystem = "jobs",
            component = "dispatch",
            provider = %state.registry.active_provider(),
            model = %state.registry.active_model(),
            max_concurrent,
            timeout_secs = config.request_timeout.as_secs(),
            "Dispatch engine initialized"
        );

        Ok(Self {
            registry: RwLock::new(state.registry),
            credentials: RwLock::new(state.credentials),
            prompts: RwLock::new(state.prompts),
            client,
            runtime,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            resolver: Arc::new(resolve_backend),
            config,
        })
    }

    /// Load all state for `config` and create the engine.
    pub fn from_config(config: &AppConfig, runtime: Handle) -> Result<Self> {
        Self::new(EngineState::load(config)?, DispatchConfig::from(config), runtime)
    }

    /// Replace the backend resolver.
    pub fn with_backend_resolver(mut self, resolver: BackendResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run `operation` over `content` and hand the outcome to `callback`.
    ///
    /// Empty content invokes the callback before returning, with nothing
    /// scheduled. Otherwise the callback runs once on a runtime worker
    /// with a success or failure envelope.
    pub fn process<F>(&self, content: &str, operation: &str, callback: F)
    where
        F: FnOnce(ResultEnvelope) + Send + 'static,
    {
        let callback = CallbackGuard::new(callback, operation);

        if content.is_empty() {
            debug!(subsystem = "jobs", ai_op = operation, "Rejected empty content");
            callback.complete(ResultEnvelope::failure(&Error::EmptyContent));
            return;
        }

        let request = match self.capture(content, operation) {
            Ok(request) => request,
            Err(e) => {
                error!(subsystem = "jobs", ai_op = operation, error = %e, "Failed to capture dispatch state");
                callback.complete(ResultEnvelope::failure(&e));
                return;
            }
        };

        let client = self.client.clone();
        let permits = self.permits.clone();
        let resolver = self.resolver.clone();
        let runtime = self.runtime.clone();

        // If the runtime is shut down the task is dropped unpolled and the
        // guard reports the failure instead.
        self.runtime.spawn(async move {
            let operation = request.operation.clone();
            let inner = runtime.spawn(execute(request, client, permits, resolver));
            let envelope = match inner.await {
                Ok(envelope) => envelope,
                Err(e) => {
                    error!(
                        subsystem = "jobs",
                        ai_op = %operation,
                        error = %e,
                        "Dispatch task panicked"
                    );
                    ResultEnvelope::failure(&Error::Internal(format!(
                        "Dispatch task failed: {}",
                        e
                    )))
                }
            };
            callback.complete(envelope);
        });
    }

    /// Submit a request and wait for its envelope.
    pub async fn process_and_wait(&self, content: &str, operation: &str) -> ResultEnvelope {
        let (tx, rx) = oneshot::channel();
        self.process(content, operation, move |envelope| {
            let _ = tx.send(envelope);
        });
        rx.await.unwrap_or_else(|_| {
            ResultEnvelope::failure(&Error::Internal("Dispatch result was dropped".to_string()))
        })
    }

    /// Switch the active provider (when given) and set its model.
    pub fn set_model(&self, model: &str, provider: Option<&str>) -> Result<()> {
        self.registry
            .write()
            .map_err(|_| poisoned("registry"))?
            .set_model(model, provider)
    }

    /// Switch the active provider, keeping the model it already has.
    pub fn set_provider(&self, provider: &str) -> Result<()> {
        self.registry
            .write()
            .map_err(|_| poisoned("registry"))?
            .set_provider(provider)
    }

    /// Apply a `provider:model` or bare model slug.
    pub fn set_model_slug(&self, slug: &str) -> Result<()> {
        self.registry
            .write()
            .map_err(|_| poisoned("registry"))?
            .set_model_slug(slug)
    }

    /// `(provider, model)` currently active.
    pub fn active_model(&self) -> Result<(String, String)> {
        let registry = self.registry.read().map_err(|_| poisoned("registry"))?;
        Ok((
            registry.active_provider().to_string(),
            registry.active_model().to_string(),
        ))
    }

    /// Store and persist the API key for `provider`.
    pub fn set_credential(&self, provider: &str, api_key: &str) -> Result<()> {
        self.credentials
            .write()
            .map_err(|_| poisoned("credentials"))?
            .set(provider, api_key)
    }

    /// Whether a non-empty key is stored for `provider`.
    pub fn has_credential(&self, provider: &str) -> Result<bool> {
        Ok(self
            .credentials
            .read()
            .map_err(|_| poisoned("credentials"))?
            .get(provider)
            .is_some())
    }

    /// Current prompt templates.
    pub fn prompts(&self) -> Result<PromptTemplates> {
        Ok(self
            .prompts
            .read()
            .map_err(|_| poisoned("prompts"))?
            .templates()
            .clone())
    }

    /// Replace and persist the prompt templates.
    pub fn save_prompts(&self, templates: PromptTemplates) -> Result<()> {
        self.prompts
            .write()
            .map_err(|_| poisoned("prompts"))?
            .save(templates)
    }

    fn capture(&self, content: &str, operation: &str) -> Result<DispatchRequest> {
        let registry = self.registry.read().map_err(|_| poisoned("registry"))?;
        let credentials = self.credentials.read().map_err(|_| poisoned("credentials"))?;
        let prompts = self.prompts.read().map_err(|_| poisoned("prompts"))?;

        let provider = registry.snapshot(credentials.get(registry.active_provider()));
        Ok(DispatchRequest {
            content: content.to_string(),
            operation: operation.to_string(),
            templates: prompts.templates().clone(),
            provider,
        })
    }
}

/// Owns a request's callback until it has fired.
///
/// A guard dropped without [`complete`](Self::complete) hands the callback an
/// internal failure, so every submission is answered once.
struct CallbackGuard<F: FnOnce(ResultEnvelope)> {
    callback: Option<F>,
    operation: String,
}

impl<F: FnOnce(ResultEnvelope)> CallbackGuard<F> {
    fn new(callback: F, operation: &str) -> Self {
        Self {
            callback: Some(callback),
            operation: operation.to_string(),
        }
    }

    fn complete(mut self, envelope: ResultEnvelope) {
        if let Some(callback) = self.callback.take() {
            callback(envelope);
        }
    }
}

impl<F: FnOnce(ResultEnvelope)> Drop for CallbackGuard<F> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!(
                subsystem = "jobs",
                ai_op = %self.operation,
                "Dispatch task dropped before completion"
            );
            callback(ResultEnvelope::failure(&Error::Internal(
                "Dispatch task dropped before completion".to_string(),
            )));
        }
    }
}

fn poisoned(what: &str) -> Error {
    Error::Internal(format!("{} lock poisoned", what))
}

async fn execute(
    request: DispatchRequest,
    client: Client,
    permits: Arc<Semaphore>,
    resolver: BackendResolver,
) -> ResultEnvelope {
    let start = Instant::now();
    let provider = request.provider.name.clone();
    let model = request.provider.model.clone();
    let operation = request.operation.clone();

    let outcome = run(request, client, permits, resolver).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok((op, text)) => {
            info!(
                subsystem = "jobs",
                component = "dispatch",
                ai_op = %operation,
                provider = %provider,
                model = %model,
                response_len = text.len(),
                duration_ms,
                success = true,
                "AI operation completed"
            );
            ResultEnvelope::success(op, text)
        }
        Err(e) => {
            warn!(
                subsystem = "jobs",
                component = "dispatch",
                ai_op = %operation,
                provider = %provider,
                model = %model,
                duration_ms,
                success = false,
                error = %e,
                "AI operation failed"
            );
            ResultEnvelope::failure(&e)
        }
    }
}

async fn run(
    request: DispatchRequest,
    client: Client,
    permits: Arc<Semaphore>,
    resolver: BackendResolver,
) -> Result<(Operation, String)> {
    let op: Operation = request.operation.parse()?;
    let template = request
        .templates
        .get(op.as_str())
        .ok_or_else(|| Error::UnknownOperation(request.operation.clone()))?;
    let prompt = render_template(template, &request.content);

    let backend = resolver(&request.provider, client)?;

    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| Error::Internal(format!("Dispatch semaphore closed: {}", e)))?;
    debug!(
        subsystem = "jobs",
        ai_op = %op,
        prompt_len = prompt.len(),
        "Sending prompt to provider"
    );

    let text = backend.generate(&prompt).await?;
    Ok((op, postprocess(op, &text)))
}
