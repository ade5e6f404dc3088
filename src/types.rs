//! Shared types used throughout the connector
//!
//! Resource identities, the records returned by enumeration, and small
//! utility aliases shared across modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type, used for per-record attribute bags
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Resource Kinds
// ============================================================================

/// The kinds of resources this connector enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Group,
    Space,
}

impl ResourceKind {
    /// Stable string form, also used as the frame kind in page tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Group => "group",
            ResourceKind::Space => "space",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Resource Identity
// ============================================================================

/// A (kind, id) pair identifying one upstream resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceId {
    /// Create a new resource id
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

// ============================================================================
// Enumeration Outputs
// ============================================================================

/// One enumerated entity: an identity, a kind tag, and a kind-specific
/// attribute bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: ResourceId,
    pub display_name: String,
    #[serde(default)]
    pub profile: JsonObject,
}

impl EntityRecord {
    /// Create a record with an empty profile
    pub fn new(id: ResourceId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            profile: JsonObject::new(),
        }
    }

    /// Create a record with an attribute bag
    pub fn with_profile(
        id: ResourceId,
        display_name: impl Into<String>,
        profile: JsonObject,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            profile,
        }
    }
}

/// An entitlement a resource offers (e.g. group membership, a space
/// permission verb-noun pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    /// The resource offering the entitlement
    pub resource: ResourceId,
    /// Stable slug, e.g. "member" or "read-page"
    pub slug: String,
    pub display_name: String,
    pub description: String,
}

/// A grant of an entitlement to a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// The resource the entitlement belongs to
    pub resource: ResourceId,
    /// Slug of the granted entitlement
    pub entitlement: String,
    /// Who holds the grant (a user or a group)
    pub principal: ResourceId,
}
