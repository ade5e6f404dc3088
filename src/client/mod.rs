//! Typed Confluence API surface
//!
//! One method per upstream listing or write operation. Listing methods are
//! the flat paginators: each fetches exactly one page at the supplied
//! cursor, decides whether more data exists (a `_links.next` field for the
//! cursor scheme, offset arithmetic for v1, or the short-page heuristic for
//! the search listing), and returns the next opaque cursor alongside the
//! page and the rate-limit verdict observed on the call.

pub mod models;
pub mod paths;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::http::{BasicCredentials, HttpClient, HttpClientConfig, RateLimitVerdict};
use crate::pagination::increment_offset;
use models::{
    AddGroupMemberBody, AddSpacePermissionBody, ApiGroup, ApiSpace, ApiUser, PagedResponse,
    PermissionSubject, PermissionTarget, SearchResponse, SpacePermission,
};
use tracing::debug;
use url::Url;

/// One page of a flat listing: the records, the next opaque cursor (empty
/// when the enumeration is complete), and the rate-limit annotation
pub type Page<T> = (Vec<T>, String, RateLimitVerdict);

/// Client for the Confluence Cloud REST API
#[derive(Debug)]
pub struct ConfluenceClient {
    base: Url,
    http: HttpClient,
}

impl ConfluenceClient {
    /// Create a client for the given domain
    pub fn new(
        domain: &str,
        credentials: BasicCredentials,
        config: HttpClientConfig,
    ) -> Result<Self> {
        let base = paths::fallback_to_https(domain)?;
        let http = HttpClient::new(config, credentials)?;
        Ok(Self { base, http })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Probe the current-user endpoint to validate credentials
    pub async fn verify(&self) -> Result<RateLimitVerdict> {
        let url = self.url(paths::CURRENT_USER_PATH)?;
        let (user, verdict): (ApiUser, _) = self.http.get_json(&url).await?;
        if user.account_id.is_empty() {
            return Err(Error::ConnectionCheck {
                message: "current-user probe returned no account id".to_string(),
            });
        }
        Ok(verdict)
    }

    // ========================================================================
    // Flat Listings
    // ========================================================================

    /// List one page of groups (v1 offset scheme)
    pub async fn get_groups(&self, page_token: &str, page_size: u32) -> Result<Page<ApiGroup>> {
        let mut url = self.url(paths::GROUPS_LIST_PATH)?;
        paths::with_offset(&mut url, page_token, paths::clamp_page_size(page_size));

        let (response, verdict): (PagedResponse<ApiGroup>, _) = self.http.get_json(&url).await?;
        let next = if response.has_next() {
            increment_offset(page_token, response.results.len())
        } else {
            String::new()
        };
        debug!(count = response.results.len(), next = %next, "fetched groups page");
        Ok((response.results, next, verdict))
    }

    /// List one page of a group's members (v1 offset scheme)
    pub async fn get_group_members(
        &self,
        group_id: &str,
        page_token: &str,
        page_size: u32,
    ) -> Result<Page<ApiUser>> {
        let mut url = self.url(&paths::group_members_path(group_id))?;
        paths::with_offset(&mut url, page_token, paths::clamp_page_size(page_size));

        let (response, verdict): (PagedResponse<ApiUser>, _) = self.http.get_json(&url).await?;
        let next = if response.has_next() {
            increment_offset(page_token, response.results.len())
        } else {
            String::new()
        };
        debug!(group_id, count = response.results.len(), next = %next, "fetched members page");
        Ok((response.results, next, verdict))
    }

    /// List one page of the user search (v1 offset scheme, no `_links`)
    ///
    /// End of data is detected by the short-page heuristic: fewer results
    /// than requested means the final page. This under-counts if the
    /// provider ever returns an exactly-full final page; a known limitation
    /// of the upstream API.
    pub async fn search_users(&self, page_token: &str, page_size: u32) -> Result<Page<ApiUser>> {
        let requested = paths::clamp_page_size(page_size);
        let mut url = self.url(paths::SEARCH_USERS_PATH)?;
        url.query_pairs_mut().append_pair("cql", "type=user");
        paths::with_offset(&mut url, page_token, requested);

        let (response, verdict): (SearchResponse, _) = self.http.get_json(&url).await?;
        let next = if response.results.len() < requested as usize {
            String::new()
        } else {
            increment_offset(page_token, response.results.len())
        };
        let users = response.results.into_iter().map(|hit| hit.user).collect();
        Ok((users, next, verdict))
    }

    /// List one page of spaces (v2 cursor scheme)
    pub async fn get_spaces(&self, cursor: &str, page_size: u32) -> Result<Page<ApiSpace>> {
        let mut url = self.url(paths::SPACES_LIST_PATH)?;
        paths::with_cursor(&mut url, cursor, paths::clamp_page_size(page_size));

        let (response, verdict): (PagedResponse<ApiSpace>, _) = self.http.get_json(&url).await?;
        let next = response
            .links
            .next
            .as_deref()
            .map(paths::extract_cursor)
            .unwrap_or_default();
        Ok((response.results, next, verdict))
    }

    /// List one page of a space's permissions (v2 cursor scheme)
    pub async fn get_space_permissions(
        &self,
        space_id: &str,
        cursor: &str,
        page_size: u32,
    ) -> Result<Page<SpacePermission>> {
        let mut url = self.url(&paths::space_permissions_path(space_id))?;
        paths::with_cursor(&mut url, cursor, paths::clamp_page_size(page_size));

        let (response, verdict): (PagedResponse<SpacePermission>, _) =
            self.http.get_json(&url).await?;
        let next = response
            .links
            .next
            .as_deref()
            .map(paths::extract_cursor)
            .unwrap_or_default();
        Ok((response.results, next, verdict))
    }

    // ========================================================================
    // Group Membership Writes
    // ========================================================================

    /// Add a user to a group. Fire-and-forget: one HTTP call, no local
    /// compensation.
    pub async fn add_group_member(
        &self,
        group_id: &str,
        account_id: &str,
    ) -> Result<RateLimitVerdict> {
        let mut url = self.url(paths::GROUP_MEMBERSHIP_PATH)?;
        url.query_pairs_mut().append_pair("groupId", group_id);

        let body = serde_json::to_value(AddGroupMemberBody {
            account_id: account_id.to_string(),
        })?;
        self.http.post(&url, &body).await
    }

    /// Remove a user from a group
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        account_id: &str,
    ) -> Result<RateLimitVerdict> {
        let mut url = self.url(paths::GROUP_MEMBERSHIP_PATH)?;
        url.query_pairs_mut()
            .append_pair("groupId", group_id)
            .append_pair("accountId", account_id);
        self.http.delete(&url).await
    }

    // ========================================================================
    // Space Permission Writes
    // ========================================================================

    /// Grant a space permission to a user or group (v1)
    pub async fn add_space_permission(
        &self,
        space_key: &str,
        operation_key: &str,
        target_type: &str,
        principal_id: &str,
        principal_type: &str,
    ) -> Result<RateLimitVerdict> {
        let url = self.url(&paths::space_permission_create_path(space_key))?;
        let body = serde_json::to_value(AddSpacePermissionBody {
            subject: PermissionSubject {
                subject_type: principal_type.to_string(),
                identifier: principal_id.to_string(),
            },
            operation: PermissionTarget {
                key: operation_key.to_string(),
                target: target_type.to_string(),
            },
        })?;
        self.http.post(&url, &body).await
    }

    /// Revoke a space permission.
    ///
    /// The provider offers no lookup by (principal, operation), so the
    /// permission id is resolved by scanning the space's permission listing.
    /// A missing match is reported as a distinct error rather than silently
    /// succeeding.
    pub async fn remove_space_permission(
        &self,
        space: &str,
        operation_key: &str,
        target_type: &str,
        principal_id: &str,
        principal_type: &str,
    ) -> Result<RateLimitVerdict> {
        let permission_id = self
            .find_permission_id(space, operation_key, target_type, principal_id, principal_type)
            .await?;

        let url = self.url(&paths::space_permission_delete_path(space, &permission_id))?;
        self.http.delete(&url).await
    }

    /// Scan the space's permission pages for the matching grant
    async fn find_permission_id(
        &self,
        space: &str,
        operation_key: &str,
        target_type: &str,
        principal_id: &str,
        principal_type: &str,
    ) -> Result<String> {
        let mut cursor = String::new();
        loop {
            let (permissions, next, _) = self
                .get_space_permissions(space, &cursor, paths::MAX_PAGE_SIZE)
                .await?;

            for permission in permissions {
                if permission.principal.id == principal_id
                    && permission.principal.principal_type == principal_type
                    && permission.operation.key == operation_key
                    && permission.operation.target_type == target_type
                {
                    return Ok(permission.id);
                }
            }

            if next.is_empty() {
                return Err(Error::PermissionNotFound {
                    space: space.to_string(),
                    principal: format!("{principal_type}:{principal_id}"),
                    operation: format!("{operation_key}-{target_type}"),
                });
            }
            cursor = next;
        }
    }
}
