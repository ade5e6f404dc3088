//! Tests for the typed API client and its flat paginators

use super::*;
use crate::http::{BasicCredentials, HttpClientConfig};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> ConfluenceClient {
    let credentials = BasicCredentials {
        username: "user@example.com".to_string(),
        api_key: "api-key".to_string(),
    };
    let config = HttpClientConfig {
        throttle: None,
        ..HttpClientConfig::default()
    };
    ConfluenceClient::new(&server.uri(), credentials, config).unwrap()
}

// ============================================================================
// Path Helper Tests
// ============================================================================

#[test]
fn test_clamp_page_size() {
    assert_eq!(paths::clamp_page_size(0), 50);
    assert_eq!(paths::clamp_page_size(25), 25);
    assert_eq!(paths::clamp_page_size(50), 50);
    assert_eq!(paths::clamp_page_size(500), 50);
}

#[test]
fn test_fallback_to_https() {
    let url = paths::fallback_to_https("example.atlassian.net").unwrap();
    assert_eq!(url.as_str(), "https://example.atlassian.net/");

    let url = paths::fallback_to_https("http://localhost:8090").unwrap();
    assert_eq!(url.scheme(), "http");
}

#[test]
fn test_extract_cursor_from_relative_next_link() {
    let cursor = paths::extract_cursor("/wiki/api/v2/spaces?cursor=abc123&limit=50");
    assert_eq!(cursor, "abc123");
}

#[test]
fn test_extract_cursor_missing_or_malformed() {
    assert_eq!(paths::extract_cursor("/wiki/api/v2/spaces?limit=50"), "");
    assert_eq!(paths::extract_cursor(""), "");
}

// ============================================================================
// Flat Paginator Tests (offset scheme)
// ============================================================================

#[tokio::test]
async fn test_groups_pagination_terminates_after_each_page() {
    let server = MockServer::start().await;

    // Page 1: full page with a next link.
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/group"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "g-1", "name": "confluence-users", "type": "group"},
                {"id": "g-2", "name": "system-administrators", "type": "group"}
            ],
            "_links": {"next": "/wiki/rest/api/group?start=2&limit=2"}
        })))
        .mount(&server)
        .await;

    // Page 2: short page with no next link.
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/group"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "g-3", "name": "site-admins", "type": "group"}],
            "_links": {}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);

    let mut all = Vec::new();
    let mut token = String::new();
    let mut calls = 0;
    loop {
        let (groups, next, verdict) = client.get_groups(&token, 2).await.unwrap();
        assert!(!verdict.is_rate_limited());
        all.extend(groups);
        calls += 1;
        if next.is_empty() {
            break;
        }
        token = next;
    }

    assert_eq!(calls, 2);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "confluence-users");
    assert_eq!(all[2].name, "site-admins");
}

#[tokio::test]
async fn test_group_members_offset_advances_by_returned_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/group/g-1/membersByGroupId"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"accountId": "u-1", "accountType": "atlassian", "displayName": "Alice"},
                {"accountId": "u-2", "accountType": "app", "displayName": "Bot"}
            ],
            "_links": {"next": "/wiki/rest/api/group/g-1/membersByGroupId?start=2"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (members, next, _) = client.get_group_members("g-1", "", 2).await.unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(next, "2");
    assert!(members[0].is_human());
    assert!(!members[1].is_human());
}

#[tokio::test]
async fn test_oversized_page_size_is_clamped_to_provider_max() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/group"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "_links": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (groups, next, _) = client.get_groups("", 10_000).await.unwrap();
    assert!(groups.is_empty());
    assert_eq!(next, "");
}

// ============================================================================
// Search Listing (short-page heuristic)
// ============================================================================

#[tokio::test]
async fn test_search_users_full_page_continues() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/search/user"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"user": {"accountId": "u-1", "accountType": "atlassian", "displayName": "Alice"}},
                {"user": {"accountId": "u-2", "accountType": "atlassian", "displayName": "Bob"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (users, next, _) = client.search_users("", 2).await.unwrap();
    assert_eq!(users.len(), 2);
    // Full page: no links envelope exists, so assume more data.
    assert_eq!(next, "2");
}

#[tokio::test]
async fn test_search_users_short_page_ends_enumeration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/search/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"user": {"accountId": "u-3", "accountType": "atlassian", "displayName": "Carol"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (users, next, _) = client.search_users("2", 2).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(next, "");
}

// ============================================================================
// Cursor Scheme (v2 endpoints)
// ============================================================================

#[tokio::test]
async fn test_spaces_cursor_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/api/v2/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "100", "key": "ENG", "name": "Engineering", "type": "global"},
                {"id": "101", "key": "~alice", "name": "Alice's space", "type": "personal"}
            ],
            "_links": {"next": "/wiki/api/v2/spaces?cursor=next-page&limit=50"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (spaces, next, _) = client.get_spaces("", 50).await.unwrap();

    assert_eq!(spaces.len(), 2);
    assert_eq!(next, "next-page");
    assert!(!spaces[0].is_personal());
    assert!(spaces[1].is_personal());
}

#[tokio::test]
async fn test_spaces_cursor_sent_on_subsequent_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/api/v2/spaces"))
        .and(query_param("cursor", "next-page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "102", "key": "OPS", "name": "Operations", "type": "global"}],
            "_links": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (spaces, next, _) = client.get_spaces("next-page", 50).await.unwrap();
    assert_eq!(spaces.len(), 1);
    assert_eq!(next, "");
}

// ============================================================================
// Verification and Writes
// ============================================================================

#[tokio::test]
async fn test_verify_requires_account_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/user/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "", "accountType": "atlassian", "displayName": ""
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.verify().await.unwrap_err();
    assert!(matches!(err, Error::ConnectionCheck { .. }));
}

#[tokio::test]
async fn test_add_group_member_posts_account_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/group/userByGroupId"))
        .and(query_param("groupId", "g-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let verdict = client.add_group_member("g-1", "u-1").await.unwrap();
    assert!(!verdict.is_rate_limited());
}

#[tokio::test]
async fn test_remove_space_permission_resolves_id_by_scanning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/api/v2/spaces/ENG/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "perm-1",
                    "principal": {"type": "user", "id": "u-1"},
                    "operation": {"key": "read", "targetType": "space"}
                },
                {
                    "id": "perm-2",
                    "principal": {"type": "group", "id": "g-1"},
                    "operation": {"key": "administer", "targetType": "space"}
                }
            ],
            "_links": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/wiki/rest/api/space/ENG/permissions/perm-2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .remove_space_permission("ENG", "administer", "space", "g-1", "group")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remove_space_permission_not_found_is_distinct_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/api/v2/spaces/ENG/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "_links": {}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .remove_space_permission("ENG", "read", "space", "u-9", "user")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PermissionNotFound { .. }));
    assert!(!err.is_retryable());
}
