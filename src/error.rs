//! Error types for the Confluence connector
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! The taxonomy distinguishes recoverable rate-limit failures (the caller may
//! retry the identical call with the identical page token) from everything
//! else, which is fatal for the call that produced it.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// A caller-supplied page token failed to decode. Always a caller bug,
    /// never retried.
    #[error("Malformed page token: {message}")]
    InvalidPageToken { message: String },

    /// A page-token frame named a resource kind the enumeration does not
    /// understand.
    #[error("Unexpected resource kind in page token: {kind}")]
    UnexpectedResourceKind { kind: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx, non-rate-limit upstream response. The body is truncated
    /// before it is stored here.
    #[error("Request failed. Status: {status}, Url: {url}, Body: {body}")]
    RequestFailed {
        status: u16,
        url: String,
        body: String,
    },

    /// The upstream reported rate limiting and the bounded internal retry
    /// budget was exhausted. Recoverable: the same call with the same token
    /// may be issued again.
    #[error("Rate limited by upstream, retry after {retry_after_seconds:?}s")]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Connector Errors
    // ============================================================================
    #[error("Connection check failed: {message}")]
    ConnectionCheck { message: String },

    /// A derived lookup (list-and-scan for a space permission before revoking
    /// it) failed to find its target.
    #[error("No '{operation}' permission found for {principal} on space {space}")]
    PermissionNotFound {
        space: String,
        principal: String,
        operation: String,
    },

    // ============================================================================
    // I/O and Generic Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a malformed page token error
    pub fn invalid_page_token(message: impl Into<String>) -> Self {
        Self::InvalidPageToken {
            message: message.into(),
        }
    }

    /// Create an upstream request error
    pub fn request_failed(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Whether the caller may retry the identical call (same page token)
    /// and reasonably expect it to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;
