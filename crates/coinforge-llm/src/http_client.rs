//! Shared HTTP plumbing for the hosted providers
//!
//! One reqwest client per backend, with a small bounded retry for
//! transient failures (5xx, connection errors). Auth and quota errors
//! are never retried.

use std::time::Duration;

use coinforge_utils::error::LlmError;
use tracing::{debug, warn};

/// Maximum retry attempts after the initial request.
const MAX_RETRIES: u32 = 2;

/// Base delay between retries; doubled per attempt.
const RETRY_BASE_DELAY_MS: u64 = 250;

pub(crate) struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub(crate) fn new() -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Start a POST request against the shared connection pool.
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }

    /// Execute a request, mapping HTTP status classes onto the error
    /// taxonomy and retrying transient failures with bounded backoff.
    pub(crate) async fn execute_with_retry(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
        provider: &str,
    ) -> Result<reqwest::Response, LlmError> {
        let mut attempt = 0;
        loop {
            let req = request
                .try_clone()
                .ok_or_else(|| {
                    LlmError::Transport("request body is not cloneable for retry".to_string())
                })?
                .timeout(timeout);

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let retryable = status.is_server_error();
                    let body = response.text().await.unwrap_or_default();
                    let err = classify_status(status, &body, provider);
                    if retryable && attempt < MAX_RETRIES {
                        attempt += 1;
                        let delay = RETRY_BASE_DELAY_MS << (attempt - 1);
                        warn!(
                            provider,
                            status = status.as_u16(),
                            attempt,
                            "Transient provider error; retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        continue;
                    }
                    return Err(err);
                }
                Err(e) if e.is_timeout() => {
                    return Err(LlmError::Timeout {
                        seconds: timeout.as_secs(),
                    });
                }
                Err(e) if e.is_connect() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY_MS << (attempt - 1);
                    debug!(provider, attempt, "Connection error; retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    return Err(LlmError::Transport(format!("{provider}: {e}")));
                }
            }
        }
    }
}

fn classify_status(
    status: reqwest::StatusCode,
    body: &str,
    provider: &str,
) -> LlmError {
    let tail: String = body.chars().take(200).collect();
    match status.as_u16() {
        401 | 403 => LlmError::Auth(format!("{provider} returned {status}: {tail}")),
        429 => LlmError::Quota(format!("{provider} returned {status}: {tail}")),
        _ => LlmError::Transport(format!("{provider} returned {status}: {tail}")),
    }
}
