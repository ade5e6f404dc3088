//! HTTP executor with bounded backoff on rate-limited responses
//!
//! Policy: backoff is engine-internal and bounded. A rate-limited verdict
//! triggers a cancellable sleep (the provider's Retry-After clamped into
//! `[backoff_floor, backoff_ceiling]`) followed by a retry of the identical
//! request, up to `max_retry_attempts` times; once the budget is exhausted
//! the call surfaces the recoverable [`Error::RateLimited`] so the caller
//! can decide whether to re-issue the same call. Every other non-2xx
//! response fails immediately and non-retryably with the status, URL, and a
//! truncated response body.

use super::rate_limit::{classify, RateLimitVerdict, Throttle, ThrottleConfig};
use crate::error::{Error, Result};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cap on stored error-response bodies
const MAX_ERROR_BODY_BYTES: usize = 2048;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the HTTP executor
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Retries of a rate-limited request before surfacing the error
    pub max_retry_attempts: u32,
    /// Minimum wait before a retry, guards against a zero/ambiguous
    /// Retry-After header
    pub backoff_floor: Duration,
    /// Maximum wait before a retry, bounds worst-case page fetch latency
    pub backoff_ceiling: Duration,
    /// Wait used when the provider declares no Retry-After
    pub default_retry_after: Duration,
    /// Proactive throttle, None to disable
    pub throttle: Option<ThrottleConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retry_attempts: 3,
            backoff_floor: Duration::from_secs(1),
            backoff_ceiling: Duration::from_secs(150),
            default_retry_after: Duration::from_secs(60),
            throttle: Some(ThrottleConfig::default()),
            user_agent: format!("confluence-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Basic-auth credentials attached to every request
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub api_key: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("api_key", &"***")
            .finish()
    }
}

// ============================================================================
// Executor
// ============================================================================

/// HTTP executor: throttle, basic auth, classification, bounded backoff
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: BasicCredentials,
    throttle: Option<Throttle>,
    cancel: CancellationToken,
}

impl HttpClient {
    /// Create an executor from config and credentials
    pub fn new(config: HttpClientConfig, credentials: BasicCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let throttle = config.throttle.as_ref().map(Throttle::new);

        Ok(Self {
            client,
            config,
            credentials,
            throttle,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the cancellation token; backoff sleeps abort when it fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// GET a URL and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<(T, RateLimitVerdict)> {
        let (bytes, verdict) = self.execute(Method::GET, url, None).await?;
        let decoded = serde_json::from_slice(&bytes)?;
        Ok((decoded, verdict))
    }

    /// POST a JSON body, ignoring the response payload
    pub async fn post(&self, url: &Url, body: &Value) -> Result<RateLimitVerdict> {
        let (_, verdict) = self.execute(Method::POST, url, Some(body)).await?;
        Ok(verdict)
    }

    /// DELETE a URL, ignoring the response payload
    pub async fn delete(&self, url: &Url) -> Result<RateLimitVerdict> {
        let (_, verdict) = self.execute(Method::DELETE, url, None).await?;
        Ok(verdict)
    }

    /// Perform one logical request with the bounded backoff policy
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<(Vec<u8>, RateLimitVerdict)> {
        let mut attempt = 0;
        loop {
            if let Some(ref throttle) = self.throttle {
                throttle.wait().await;
            }

            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .basic_auth(&self.credentials.username, Some(&self.credentials.api_key))
                .header("X-Atlassian-Token", "no-check");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            let verdict = classify(status, response.headers());

            if verdict.is_rate_limited() {
                if attempt < self.config.max_retry_attempts {
                    let wait = self.clamp_backoff(verdict.retry_after);
                    warn!(
                        status = status.as_u16(),
                        attempt,
                        wait_secs = wait.as_secs(),
                        "rate limited, backing off before retry"
                    );
                    self.sleep_cancellable(wait).await?;
                    attempt += 1;
                    continue;
                }
                return Err(Error::RateLimited {
                    retry_after_seconds: verdict.retry_after.map(|d| d.as_secs()),
                });
            }

            if !status.is_success() {
                let bytes = response.bytes().await.unwrap_or_default();
                return Err(Error::request_failed(
                    status.as_u16(),
                    url.as_str(),
                    truncate_body(&bytes, MAX_ERROR_BODY_BYTES),
                ));
            }

            debug!(%method, %url, status = status.as_u16(), "request succeeded");
            let bytes = response.bytes().await?;
            return Ok((bytes.to_vec(), verdict));
        }
    }

    /// Clamp a provider wait into the configured floor/ceiling
    pub fn clamp_backoff(&self, retry_after: Option<Duration>) -> Duration {
        retry_after
            .unwrap_or(self.config.default_retry_after)
            .clamp(self.config.backoff_floor, self.config.backoff_ceiling)
    }

    /// Sleep that aborts with [`Error::Cancelled`] when the caller's token
    /// fires
    async fn sleep_cancellable(&self, wait: Duration) -> Result<()> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}

/// Truncate a response body for inclusion in an error
pub fn truncate_body(body: &[u8], max: usize) -> String {
    if body.len() > max {
        format!("{} ...", String::from_utf8_lossy(&body[..max]))
    } else {
        String::from_utf8_lossy(body).to_string()
    }
}
