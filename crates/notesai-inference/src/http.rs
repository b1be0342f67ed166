//! Shared HTTP plumbing for the provider backends.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use notesai_core::defaults::SLOW_GENERATION_MS;
use notesai_core::{Error, Result};

/// Build the HTTP client shared by all backends, with an explicit
/// per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))
}

/// Send `request` and decode a successful JSON body as `T`.
///
/// Non-2xx statuses become [`Error::Provider`] with the raw body text.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T> {
    let start = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|e| Error::Request(format!("{} request failed: {}", provider, e)))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let elapsed = start.elapsed().as_millis() as u64;
        warn!(
            provider,
            status = status.as_u16(),
            duration_ms = elapsed,
            "Provider returned error status"
        );
        return Err(Error::Provider {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Request(format!("Failed to read {} response: {}", provider, e)))?;
    let elapsed = start.elapsed().as_millis() as u64;

    debug!(
        provider,
        response_len = body.len(),
        duration_ms = elapsed,
        "Provider response received"
    );
    if elapsed > SLOW_GENERATION_MS {
        warn!(provider, duration_ms = elapsed, slow = true, "Slow generation operation");
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::Inference(format!("Failed to parse {} response: {}", provider, e)))
}
