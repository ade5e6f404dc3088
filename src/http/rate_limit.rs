//! Rate-limit classification and proactive throttling
//!
//! [`classify`] turns one HTTP response (status plus headers) into a
//! [`RateLimitVerdict`]. Per the provider's documentation, transient 5xx
//! responses can indicate throttling without the usual 429 signaling, so
//! 502/503/504 are treated as rate-limit errors alongside 429 and an
//! explicit exhausted-quota header.
//!
//! [`Throttle`] is the client-side token bucket (governor crate) applied
//! before each request to stay under the limit in the first place.

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const RETRY_AFTER_HEADER: &str = "retry-after";
const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

// ============================================================================
// Verdict
// ============================================================================

/// How a response classifies with respect to rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitState {
    /// Not rate limited
    #[default]
    Ok,
    /// The provider reported quota exhaustion (429 or a zeroed remaining
    /// header)
    Overlimit,
    /// A transient upstream error that should be treated as throttling
    Error,
}

/// Structured rate-limit classification of one HTTP response
///
/// Derived once per response and handed back to the enumeration caller as a
/// side annotation; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitVerdict {
    pub state: RateLimitState,
    /// Provider-requested wait before the next attempt, if declared
    pub retry_after: Option<Duration>,
    /// Declared request quota, if present
    pub limit: Option<u64>,
    /// Declared remaining quota, if present
    pub remaining: Option<u64>,
}

impl RateLimitVerdict {
    /// Whether this verdict should trigger a wait-and-retry rather than a
    /// hard failure
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.state, RateLimitState::Overlimit | RateLimitState::Error)
    }
}

/// Classify one HTTP response. Pure function of status code and headers.
pub fn classify(status: StatusCode, headers: &HeaderMap) -> RateLimitVerdict {
    let retry_after = parse_retry_after(headers);
    let limit = parse_u64_header(headers, LIMIT_HEADER);
    let remaining = parse_u64_header(headers, REMAINING_HEADER);

    let state = if status == StatusCode::TOO_MANY_REQUESTS || remaining == Some(0) {
        RateLimitState::Overlimit
    } else if matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    ) {
        RateLimitState::Error
    } else {
        RateLimitState::Ok
    };

    RateLimitVerdict {
        state,
        retry_after,
        limit,
        remaining,
    }
}

/// Parse Retry-After as integer seconds or an HTTP-date
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER_HEADER)?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let delta = date.with_timezone(&Utc) - Utc::now();
    Some(Duration::from_secs(delta.num_seconds().max(0) as u64))
}

fn parse_u64_header(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

// ============================================================================
// Proactive Throttle
// ============================================================================

/// Configuration for the client-side token bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in the bucket)
    pub burst_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl ThrottleConfig {
    /// Create a new throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket throttle applied before each upstream request
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Create a throttle from the given config
    pub fn new(config: &ThrottleConfig) -> Self {
        let one = NonZeroU32::MIN;
        let quota = Quota::per_second(NonZeroU32::new(config.requests_per_second).unwrap_or(one))
            .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(one));

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait until a request may be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Check whether a request may be made immediately
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish()
    }
}
