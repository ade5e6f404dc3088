//! Enumeration façade
//!
//! One [`ResourceSyncer`] per resource kind. A syncer's listing methods all
//! share the same contract: the caller passes an opaque page token (empty
//! for the start of an enumeration) and receives one page of records, the
//! next token (empty when the enumeration is complete), and the rate-limit
//! annotation observed during the call. Every call performs at most one
//! upstream page fetch and is independently retryable with the same input
//! token; no caller-visible state mutates on failure.
//!
//! Duplicate records are possible in the user enumeration (the same user is
//! reachable through every group it belongs to); the façade deliberately
//! does not suppress them mid-stream, keeping tokens small and restartable.
//! Callers needing a duplicate-free set own the dedup, as
//! [`drive_entities`] demonstrates.

mod groups;
mod spaces;
mod users;


pub use groups::GroupSyncer;
pub use spaces::SpaceSyncer;
pub use users::UserSyncer;

use crate::client::ConfluenceClient;
use crate::config::{filter_allowed, ConnectorConfig, DEFAULT_NOUNS, DEFAULT_VERBS};
use crate::error::{Error, Result};
use crate::http::{BasicCredentials, HttpClientConfig, RateLimitVerdict};
use crate::types::{EntityRecord, EntitlementRecord, GrantRecord, ResourceId, ResourceKind};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Default page size for listings
pub const RESOURCES_PAGE_SIZE: u32 = 50;

/// Cap on outer (group) pages in the two-level user enumeration. Each outer
/// page fans out into one token frame per group, so this stays small to
/// bound per-call latency and encoded stack depth.
pub const GROUP_PAGE_SIZE_MAXIMUM: u32 = 25;

/// Slug of the single group entitlement
pub const GROUP_MEMBER_ENTITLEMENT: &str = "member";

const SLUG_SEPARATOR: char = '-';

// ============================================================================
// Façade Contract
// ============================================================================

/// Opaque page token plus the caller's requested page size
#[derive(Debug, Clone, Default)]
pub struct PageToken {
    pub token: String,
    pub size: u32,
}

impl PageToken {
    /// Start-of-enumeration token with the default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume token
    pub fn resume(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            size: 0,
        }
    }

    pub(crate) fn effective_size(&self) -> u32 {
        if self.size == 0 {
            RESOURCES_PAGE_SIZE
        } else {
            self.size
        }
    }
}

/// One page returned by a façade call
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub records: Vec<T>,
    /// Empty when the enumeration is complete
    pub next_token: String,
    /// Rate-limit state observed during the call, separate from its
    /// success or failure
    pub rate_limit: Option<RateLimitVerdict>,
}

impl<T> ListPage<T> {
    /// A complete, empty page with no annotation
    pub fn done() -> Self {
        Self {
            records: Vec::new(),
            next_token: String::new(),
            rate_limit: None,
        }
    }
}

/// Per-resource-kind enumeration interface
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The kind of resource this syncer enumerates
    fn resource_kind(&self) -> ResourceKind;

    /// List one page of resources of this kind
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> Result<ListPage<EntityRecord>>;

    /// List one page of the entitlements a resource offers
    async fn entitlements(
        &self,
        _resource: &ResourceId,
        _token: &PageToken,
    ) -> Result<ListPage<EntitlementRecord>> {
        Ok(ListPage::done())
    }

    /// List one page of the grants held against a resource
    async fn grants(
        &self,
        _resource: &ResourceId,
        _token: &PageToken,
    ) -> Result<ListPage<GrantRecord>> {
        Ok(ListPage::done())
    }
}

// ============================================================================
// Entitlement Slugs
// ============================================================================

/// Build an entitlement slug from a verb and a target noun
pub fn entitlement_slug(verb: &str, noun: &str) -> String {
    format!("{verb}{SLUG_SEPARATOR}{noun}")
}

/// Split an entitlement slug back into its verb and target noun
pub fn split_entitlement_slug(slug: &str) -> Result<(&str, &str)> {
    slug.split_once(SLUG_SEPARATOR)
        .ok_or_else(|| Error::Other(format!("malformed entitlement slug '{slug}'")))
}

// ============================================================================
// Connector
// ============================================================================

/// The connector: owns the API client and the immutable permission
/// allow-lists, and hands out per-kind syncers
pub struct Connector {
    client: Arc<ConfluenceClient>,
    skip_personal_spaces: bool,
    nouns: Vec<String>,
    verbs: Vec<String>,
}

impl Connector {
    /// Build a connector from configuration
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        config.validate()?;

        let nouns = filter_allowed("noun", &config.nouns, DEFAULT_NOUNS)?;
        let verbs = filter_allowed("verb", &config.verbs, DEFAULT_VERBS)?;

        let credentials = BasicCredentials {
            username: config.username.clone(),
            api_key: config.api_key.clone(),
        };
        let http_config = HttpClientConfig {
            throttle: config.throttle.clone(),
            ..HttpClientConfig::default()
        };
        let client = ConfluenceClient::new(&config.domain_url, credentials, http_config)?;

        Ok(Self {
            client: Arc::new(client),
            skip_personal_spaces: config.skip_personal_spaces,
            nouns,
            verbs,
        })
    }

    /// Build a connector around an existing client (tests)
    pub fn with_client(
        client: ConfluenceClient,
        skip_personal_spaces: bool,
        nouns: Vec<String>,
        verbs: Vec<String>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            skip_personal_spaces,
            nouns,
            verbs,
        }
    }

    /// Validate credentials against the live instance
    pub async fn validate(&self) -> Result<RateLimitVerdict> {
        self.client.verify().await.map_err(|e| match e {
            Error::ConnectionCheck { message } => Error::ConnectionCheck { message },
            other => Error::ConnectionCheck {
                message: format!("failed to validate API credentials: {other}"),
            },
        })
    }

    /// The syncers for every resource kind this connector handles
    pub fn syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        vec![
            Box::new(self.group_syncer()),
            Box::new(self.user_syncer()),
            Box::new(self.space_syncer()),
        ]
    }

    pub fn group_syncer(&self) -> GroupSyncer {
        GroupSyncer::new(Arc::clone(&self.client))
    }

    pub fn user_syncer(&self) -> UserSyncer {
        UserSyncer::new(Arc::clone(&self.client))
    }

    pub fn space_syncer(&self) -> SpaceSyncer {
        SpaceSyncer::new(
            Arc::clone(&self.client),
            self.skip_personal_spaces,
            self.nouns.clone(),
            self.verbs.clone(),
        )
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("skip_personal_spaces", &self.skip_personal_spaces)
            .field("nouns", &self.nouns)
            .field("verbs", &self.verbs)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Drive Loop
// ============================================================================

/// Drive a syncer's listing to completion.
///
/// This is the caller-side loop the façade contract assumes: call `list`
/// with the previously returned token until it comes back empty. The
/// optional seen-set lives exactly as long as this loop; it is never
/// encoded into a token, so a wholly restarted enumeration starts with a
/// fresh one.
pub async fn drive_entities(
    syncer: &dyn ResourceSyncer,
    parent: Option<&ResourceId>,
    page_size: u32,
    dedupe: bool,
) -> Result<Vec<EntityRecord>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut token = PageToken {
        token: String::new(),
        size: page_size,
    };

    loop {
        let page = syncer.list(parent, &token).await?;
        for record in page.records {
            if dedupe && !seen.insert(record.id.id.clone()) {
                continue;
            }
            records.push(record);
        }
        if page.next_token.is_empty() {
            break;
        }
        token.token = page.next_token;
    }

    info!(
        kind = %syncer.resource_kind(),
        count = records.len(),
        "enumeration complete"
    );
    Ok(records)
}
