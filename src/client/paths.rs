//! URL construction for the Confluence REST API
//!
//! Two pagination conventions coexist: the legacy v1 endpoints take
//! `start`/`limit` query parameters, while v2 endpoints take
//! `cursor`/`limit` and report the next page through a `_links.next`
//! envelope field.

use url::Url;

use crate::error::Result;

pub const CURRENT_USER_PATH: &str = "/wiki/rest/api/user/current";
pub const GROUPS_LIST_PATH: &str = "/wiki/rest/api/group";
pub const GROUP_MEMBERSHIP_PATH: &str = "/wiki/rest/api/group/userByGroupId";
pub const SEARCH_USERS_PATH: &str = "/wiki/rest/api/search/user";
pub const SPACES_LIST_PATH: &str = "/wiki/api/v2/spaces";

/// Provider-side cap on page sizes
pub const MAX_PAGE_SIZE: u32 = 50;

/// v1 members-of-group listing
pub fn group_members_path(group_id: &str) -> String {
    format!("/wiki/rest/api/group/{group_id}/membersByGroupId")
}

/// v2 space permission listing
pub fn space_permissions_path(space_id: &str) -> String {
    format!("/wiki/api/v2/spaces/{space_id}/permissions")
}

/// v1 space permission creation
pub fn space_permission_create_path(space_key: &str) -> String {
    format!("/wiki/rest/api/space/{space_key}/permissions")
}

/// v1 space permission deletion (requires the permission id)
pub fn space_permission_delete_path(space_key: &str, permission_id: &str) -> String {
    format!("/wiki/rest/api/space/{space_key}/permissions/{permission_id}")
}

/// Clamp a requested page size into `[1, MAX_PAGE_SIZE]`, defaulting to the
/// maximum when unset or oversized
pub fn clamp_page_size(requested: u32) -> u32 {
    if requested == 0 || requested > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        requested
    }
}

/// Parse a configured domain, tacking on "https://" when no scheme was
/// given. A user can still override the scheme by including it explicitly.
pub fn fallback_to_https(domain: &str) -> Result<Url> {
    if domain.contains("://") {
        return Ok(Url::parse(domain)?);
    }
    Ok(Url::parse(&format!("https://{domain}"))?)
}

/// Add v1 `start`/`limit` offset pagination parameters
pub fn with_offset(url: &mut Url, page_token: &str, page_size: u32) {
    let start = if page_token.is_empty() {
        "0"
    } else {
        page_token
    };
    url.query_pairs_mut()
        .append_pair("start", start)
        .append_pair("limit", &page_size.to_string());
}

/// Add v2 `cursor`/`limit` pagination parameters
pub fn with_cursor(url: &mut Url, cursor: &str, page_size: u32) {
    {
        let mut pairs = url.query_pairs_mut();
        if !cursor.is_empty() {
            pairs.append_pair("cursor", cursor);
        }
        pairs.append_pair("limit", &page_size.to_string());
    }
}

/// Extract the `cursor` query parameter from a `_links.next` value.
///
/// The provider emits `next` as a relative URL; an unparseable link yields
/// an empty cursor (end of data).
pub fn extract_cursor(next_link: &str) -> String {
    let base = match Url::parse("https://placeholder.invalid") {
        Ok(base) => base,
        Err(_) => return String::new(),
    };
    let Ok(parsed) = base.join(next_link) else {
        return String::new();
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == "cursor")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
