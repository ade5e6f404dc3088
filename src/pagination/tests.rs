//! Tests for the page token codec

use super::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Round-Trip Tests
// ============================================================================

#[test]
fn test_empty_token_decodes_to_empty_bag() {
    let bag = TokenBag::unmarshal("").unwrap();
    assert!(bag.is_empty());
    assert!(bag.current().is_none());
    assert_eq!(bag.page_token(), "");
}

#[test]
fn test_empty_bag_encodes_to_empty_token() {
    let bag = TokenBag::new();
    assert_eq!(bag.marshal().unwrap(), "");
}

#[test]
fn test_round_trip_single_frame() {
    let mut bag = TokenBag::new();
    bag.push(PageState {
        resource_kind: "group".to_string(),
        resource_id: None,
        token: "50".to_string(),
    });

    let encoded = bag.marshal().unwrap();
    let decoded = TokenBag::unmarshal(&encoded).unwrap();
    assert_eq!(decoded, bag);
}

#[test]
fn test_round_trip_nested_stack() {
    let mut bag = TokenBag::new();
    bag.push(PageState {
        resource_kind: "user".to_string(),
        resource_id: None,
        token: "25".to_string(),
    });
    bag.push(PageState::nested("group", "administrators"));
    bag.push(PageState {
        resource_kind: "group".to_string(),
        resource_id: Some("confluence-users".to_string()),
        token: "100".to_string(),
    });

    let encoded = bag.marshal().unwrap();
    let decoded = TokenBag::unmarshal(&encoded).unwrap();
    assert_eq!(decoded, bag);
    assert_eq!(decoded.depth(), 3);
    assert_eq!(decoded.page_token(), "100");
    assert_eq!(
        decoded.current().unwrap().resource_id.as_deref(),
        Some("confluence-users")
    );
}

#[test]
fn test_unmarshal_garbage_is_an_error() {
    let result = TokenBag::unmarshal("not json at all");
    assert!(matches!(
        result,
        Err(crate::error::Error::InvalidPageToken { .. })
    ));
}

// ============================================================================
// Stack Operation Tests
// ============================================================================

#[test]
fn test_next_with_token_replaces_cursor() {
    let mut bag = TokenBag::new();
    bag.push(PageState::new("group"));

    bag.next("50");
    assert_eq!(bag.depth(), 1);
    assert_eq!(bag.page_token(), "50");

    bag.next("100");
    assert_eq!(bag.page_token(), "100");
}

#[test]
fn test_next_with_empty_token_pops_frame() {
    let mut bag = TokenBag::new();
    bag.push(PageState::new("user"));
    bag.push(PageState::nested("group", "g-1"));

    bag.next("");
    assert_eq!(bag.depth(), 1);
    assert_eq!(bag.resource_kind(), "user");

    bag.next("");
    assert!(bag.is_empty());
    // Draining below the bottom frame yields the completion token.
    assert_eq!(bag.marshal().unwrap(), "");
}

#[test]
fn test_next_on_empty_bag_is_a_no_op() {
    let mut bag = TokenBag::new();
    bag.next("");
    bag.next("5");
    assert!(bag.is_empty());
}

#[test]
fn test_innermost_frame_is_processed_first() {
    let mut bag = TokenBag::new();
    bag.push(PageState::new("user"));
    bag.push(PageState::nested("group", "first"));
    bag.push(PageState::nested("group", "second"));

    // Most recently discovered group is on top.
    assert_eq!(
        bag.current().unwrap().resource_id.as_deref(),
        Some("second")
    );
}

// ============================================================================
// Offset Arithmetic Tests
// ============================================================================

#[test]
fn test_increment_offset_adds_returned_count() {
    assert_eq!(increment_offset("0", 50), "50");
    assert_eq!(increment_offset("50", 25), "75");
    assert_eq!(increment_offset("", 10), "10");
}

#[test]
fn test_increment_offset_zero_sum_signals_completion() {
    assert_eq!(increment_offset("", 0), "");
    assert_eq!(increment_offset("0", 0), "");
}

#[test]
fn test_increment_offset_unparseable_token_counts_as_zero() {
    assert_eq!(increment_offset("garbage", 5), "5");
    assert_eq!(increment_offset("garbage", 0), "");
}
