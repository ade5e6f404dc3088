//! HTTP layer: rate-limit classification, throttling, and the backoff
//! executor
//!
//! Every upstream call flows through [`HttpClient`], which attaches basic
//! credentials, waits on the proactive throttle, classifies the response
//! into a [`RateLimitVerdict`], and applies the bounded backoff-and-retry
//! policy for rate-limited responses.

mod client;
mod rate_limit;


pub use client::{truncate_body, BasicCredentials, HttpClient, HttpClientConfig};
pub use rate_limit::{classify, RateLimitState, RateLimitVerdict, Throttle, ThrottleConfig};
