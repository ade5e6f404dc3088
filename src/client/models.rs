//! Wire models for the Confluence REST API

use serde::{Deserialize, Serialize};

/// Account type of human users; everything else (bots, service apps) is
/// filtered out of user enumeration
pub const ACCOUNT_TYPE_ATLASSIAN: &str = "atlassian";

/// Envelope links on paginated v1/v2 list responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// Generic paginated list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(rename = "_links", default)]
    pub links: ListLinks,
}

impl<T> PagedResponse<T> {
    /// Whether the envelope advertises another page
    pub fn has_next(&self) -> bool {
        self.links.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

// ============================================================================
// Users and Groups
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub account_id: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl ApiUser {
    /// Only extant, human users are enumerated
    pub fn is_human(&self) -> bool {
        self.account_type == ACCOUNT_TYPE_ATLASSIAN
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub group_type: String,
}

/// One hit from the v1 user search; the user payload is nested
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub user: ApiUser,
}

/// The search listing has no `_links` envelope; its end is signaled only by
/// a short page
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "Vec::new")]
    pub results: Vec<SearchResult>,
}

// ============================================================================
// Spaces and Permissions
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpace {
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub space_type: String,
}

impl ApiSpace {
    pub fn is_personal(&self) -> bool {
        self.space_type == "personal"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpacePermission {
    pub id: String,
    pub principal: PermissionPrincipal,
    pub operation: PermissionOperation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPrincipal {
    #[serde(rename = "type")]
    pub principal_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOperation {
    pub key: String,
    pub target_type: String,
}

// ============================================================================
// Write Request Bodies
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroupMemberBody {
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSpacePermissionBody {
    pub subject: PermissionSubject,
    pub operation: PermissionTarget,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionSubject {
    #[serde(rename = "type")]
    pub subject_type: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionTarget {
    pub key: String,
    pub target: String,
}
