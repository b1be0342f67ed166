//! End-to-end dispatch tests against a mock provider server.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notesai_inference::{GenerationBackend, ProviderRegistry, ProviderSnapshot};
use notesai_jobs::{
    DispatchConfig, DispatchEngine, EngineState, Error, FailureKind, Operation,
    ProviderDescriptor, ProviderKind, Result, ResultEnvelope,
};
use notesai_store::{CredentialStore, PromptCatalog};

fn state(dir: &Path, server: &MockServer, active: &str) -> EngineState {
    let uri = server.uri();
    let registry = ProviderRegistry::with_providers(
        [
            ProviderDescriptor::new(
                "ollama",
                format!("{uri}/api/generate"),
                "mistral",
                ProviderKind::Local,
            ),
            ProviderDescriptor::new(
                "openai",
                format!("{uri}/v1/chat/completions"),
                "gpt-3.5-turbo",
                ProviderKind::ChatCompletion,
            ),
            ProviderDescriptor::new(
                "anthropic",
                format!("{uri}/v1/messages"),
                "claude-3-haiku-20240307",
                ProviderKind::Messages,
            ),
        ],
        active,
    )
    .unwrap();

    EngineState {
        registry,
        credentials: CredentialStore::empty(dir.join("config.json")),
        prompts: PromptCatalog::from_templates(dir.join("prompts.json"), PromptCatalog::defaults()),
    }
}

fn engine(dir: &Path, server: &MockServer, active: &str) -> DispatchEngine {
    let config = DispatchConfig::default().with_request_timeout(Duration::from_secs(5));
    DispatchEngine::new(state(dir, server, active), config, Handle::current()).unwrap()
}

fn local_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": text, "done": true }))
}

fn failure_kind(envelope: &ResultEnvelope) -> Option<FailureKind> {
    match envelope {
        ResultEnvelope::Failure { kind, .. } => Some(*kind),
        ResultEnvelope::Success { .. } => None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_content_fails_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(local_reply("x"))
        .expect(0)
        .mount(&server)
        .await;
    let engine = engine(dir.path(), &server, "ollama");

    let slot = Arc::new(Mutex::new(None));
    let sink = slot.clone();
    engine.process("", "correction", move |envelope| {
        *sink.lock().unwrap() = Some(envelope);
    });

    let envelope = slot.lock().unwrap().take().expect("callback ran before process returned");
    assert_eq!(failure_kind(&envelope), Some(FailureKind::EmptyContent));
    assert_eq!(envelope.error(), Some("content is empty"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_correction_renders_prompt_and_returns_text() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let expected_prompt = PromptCatalog::defaults()["correction"].replacen("{content}", "helo wrld", 1);

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(serde_json::json!({
            "model": "mistral",
            "prompt": expected_prompt,
            "stream": false
        })))
        .respond_with(local_reply("  hello world\n"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let envelope = engine.process_and_wait("helo wrld", "correction").await;

    assert_eq!(
        envelope,
        ResultEnvelope::success(Operation::Correction, "hello world")
    );
    assert_eq!(envelope.to_json()["operation"], "correction");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_categorization_is_shortened() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(local_reply("The category is clearly Work\nExplanation follows"))
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let envelope = engine.process_and_wait("Quarterly planning", "categorie").await;

    assert_eq!(envelope.result(), Some("The category"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_short_category_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(local_reply("Finance"))
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let envelope = engine.process_and_wait("Tax return", "categorie").await;

    assert_eq!(
        envelope,
        ResultEnvelope::success(Operation::Categorization, "Finance")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_operation_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(local_reply("x"))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let envelope = engine.process_and_wait("text", "translate").await;

    assert_eq!(failure_kind(&envelope), Some(FailureKind::UnknownOperation));
    assert_eq!(
        envelope.error(),
        Some("No prompt found for operation: translate")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_credential_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "openai");
    let envelope = engine.process_and_wait("text", "resume").await;

    assert_eq!(failure_kind(&envelope), Some(FailureKind::MissingCredential));
    assert!(envelope.error().unwrap().contains("openai"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_http_error_carries_status_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "anthropic");
    engine.set_credential("anthropic", "ak-test").unwrap();
    let envelope = engine.process_and_wait("text", "resume").await;

    assert_eq!(failure_kind(&envelope), Some(FailureKind::Http));
    let error = envelope.error().unwrap();
    assert!(error.contains("529"), "{error}");
    assert!(error.contains("overloaded"), "{error}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_set_credential_persists_and_enables_cloud_provider() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Summary."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "openai");
    engine.set_credential("openai", " sk-live ").unwrap();
    assert!(engine.has_credential("openai").unwrap());

    let envelope = engine.process_and_wait("long text", "resume").await;
    assert_eq!(
        envelope,
        ResultEnvelope::success(Operation::Summary, "Summary.")
    );

    let reloaded = CredentialStore::load(dir.path().join("config.json")).unwrap();
    assert_eq!(reloaded.get("openai"), Some("sk-live"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_set_model_only_affects_later_submissions() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"model": "mistral"})))
        .respond_with(local_reply("from mistral").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"model": "phi"})))
        .respond_with(local_reply("from phi"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");

    let (tx, rx) = oneshot::channel();
    engine.process("text", "correction", move |envelope| {
        let _ = tx.send(envelope);
    });
    engine.set_model("phi", None).unwrap();
    let second = engine.process_and_wait("text", "correction").await;
    let first = rx.await.unwrap();

    assert_eq!(first.result(), Some("from mistral"));
    assert_eq!(second.result(), Some("from phi"));
    assert_eq!(
        engine.active_model().unwrap(),
        ("ollama".to_string(), "phi".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_set_model_unknown_provider_leaves_state() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let engine = engine(dir.path(), &server, "ollama");

    let err = engine.set_model("gemini-pro", Some("gemini")).unwrap_err();

    assert!(matches!(err, Error::UnsupportedProvider(ref p) if p == "gemini"));
    assert_eq!(
        engine.active_model().unwrap(),
        ("ollama".to_string(), "mistral".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_switching_provider_keeps_its_model() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let engine = engine(dir.path(), &server, "ollama");

    engine.set_model("gpt-4o", Some("openai")).unwrap();
    engine.set_provider("ollama").unwrap();
    assert_eq!(
        engine.active_model().unwrap(),
        ("ollama".to_string(), "mistral".to_string())
    );

    engine.set_provider("openai").unwrap();
    assert_eq!(
        engine.active_model().unwrap(),
        ("openai".to_string(), "gpt-4o".to_string())
    );

    let err = engine.set_provider("gemini").unwrap_err();
    assert!(matches!(err, Error::UnsupportedProvider(ref p) if p == "gemini"));
    assert_eq!(
        engine.active_model().unwrap(),
        ("openai".to_string(), "gpt-4o".to_string())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_saved_prompts_apply_and_content_is_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "prompt": "Shorten: keep {content} literally"
        })))
        .respond_with(local_reply("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let mut templates = engine.prompts().unwrap();
    templates.insert("resume".to_string(), "Shorten: {content}".to_string());
    engine.save_prompts(templates).unwrap();

    let envelope = engine
        .process_and_wait("keep {content} literally", "resume")
        .await;

    assert!(envelope.is_success(), "{envelope:?}");
    let stored = PromptCatalog::load(dir.path().join("prompts.json")).unwrap();
    assert_eq!(stored.resolve("resume").unwrap(), "Shorten: {content}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_every_submission_gets_exactly_one_callback() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(local_reply("fine"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let engine = engine(dir.path(), &server, "ollama");
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let submissions: Vec<(&str, &str)> = vec![
        ("a", "correction"),
        ("", "correction"),
        ("b", "nope"),
        ("c", "categorie"),
        ("d", "resume"),
    ];
    for (content, op) in &submissions {
        let calls = calls.clone();
        let tx = tx.clone();
        engine.process(content, op, move |envelope| {
            calls.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(envelope);
        });
    }
    engine.set_model("gpt-3.5-turbo", Some("openai")).unwrap();
    engine.set_credential("openai", "sk").unwrap();
    for _ in 0..3 {
        let calls = calls.clone();
        let tx = tx.clone();
        engine.process("e", "resume", move |envelope| {
            calls.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(envelope);
        });
    }
    drop(tx);

    let mut envelopes = Vec::new();
    while let Some(envelope) = rx.recv().await {
        envelopes.push(envelope);
    }

    assert_eq!(envelopes.len(), 8);
    assert_eq!(calls.load(Ordering::SeqCst), 8);
    assert_eq!(envelopes.iter().filter(|e| e.is_success()).count(), 3);
    assert_eq!(
        envelopes
            .iter()
            .filter(|e| failure_kind(e) == Some(FailureKind::Http))
            .count(),
        3
    );
}

// ---------------------------------------------------------------------------
// Injected backends
// ---------------------------------------------------------------------------

struct CountingBackend {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    panic: bool,
}

#[async_trait]
impl GenerationBackend for CountingBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.panic {
            panic!("backend exploded");
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(prompt.len().to_string())
    }

    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        "counting-1"
    }
}

fn counting_engine(
    dir: &Path,
    server: &MockServer,
    max_concurrent: usize,
    panic: bool,
) -> (DispatchEngine, Arc<AtomicUsize>) {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let peak_out = peak.clone();
    let config = DispatchConfig::default().with_max_concurrent(max_concurrent);
    let engine = DispatchEngine::new(state(dir, server, "ollama"), config, Handle::current())
        .unwrap()
        .with_backend_resolver(Arc::new(move |_snapshot: &ProviderSnapshot, _client: reqwest::Client| {
            Ok(Box::new(CountingBackend {
                in_flight: in_flight.clone(),
                peak: peak.clone(),
                panic,
            }) as Box<dyn GenerationBackend>)
        }));
    (engine, peak_out)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_requests_are_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (engine, peak) = counting_engine(dir.path(), &server, 2, false);

    let (tx, mut rx) = mpsc::unbounded_channel();
    for i in 0..6 {
        let tx = tx.clone();
        engine.process(&format!("note {i}"), "correction", move |envelope| {
            let _ = tx.send(envelope);
        });
    }
    drop(tx);

    let mut done = 0;
    while let Some(envelope) = rx.recv().await {
        assert!(envelope.is_success(), "{envelope:?}");
        done += 1;
    }

    assert_eq!(done, 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_backend_panic_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let (engine, _) = counting_engine(dir.path(), &server, 1, true);

    let envelope = engine.process_and_wait("text", "correction").await;

    assert_eq!(failure_kind(&envelope), Some(FailureKind::Unexpected));
}

#[test]
fn test_callback_runs_once_after_runtime_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let state = EngineState {
        registry: ProviderRegistry::builtin(),
        credentials: CredentialStore::empty(dir.path().join("config.json")),
        prompts: PromptCatalog::from_templates(
            dir.path().join("prompts.json"),
            PromptCatalog::defaults(),
        ),
    };
    let engine =
        DispatchEngine::new(state, DispatchConfig::default(), runtime.handle().clone()).unwrap();
    drop(runtime);

    let count = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = std::sync::mpsc::channel();
    let seen = count.clone();
    engine.process("hello", "correction", move |envelope| {
        seen.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(envelope);
    });

    let envelope = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(failure_kind(&envelope), Some(FailureKind::Unexpected));
}
