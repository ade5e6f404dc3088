//! Token stack types and offset arithmetic

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Page State
// ============================================================================

/// One frame of a page token stack
///
/// `token` is scheme-specific: a decimal offset for v1 offset-paginated
/// endpoints, or an opaque provider-issued cursor for v2 endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Kind of enumeration this frame drives ("user", "group", "search", ...)
    pub resource_kind: String,

    /// Identifies the parent in a nested scan (the group whose members are
    /// being listed). Absent for top-level frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Scheme-specific cursor within this frame's enumeration
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl PageState {
    /// Create a top-level frame at the start of its enumeration
    pub fn new(resource_kind: impl Into<String>) -> Self {
        Self {
            resource_kind: resource_kind.into(),
            resource_id: None,
            token: String::new(),
        }
    }

    /// Create a nested frame scoped to a parent resource
    pub fn nested(resource_kind: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_kind: resource_kind.into(),
            resource_id: Some(resource_id.into()),
            token: String::new(),
        }
    }
}

// ============================================================================
// Token Bag
// ============================================================================

/// Ordered stack of [`PageState`] frames with an opaque string encoding
///
/// Bottom of the stack (index 0) is the outermost enumeration; the top frame
/// is the one a listing call should drive next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBag {
    states: Vec<PageState>,
}

impl TokenBag {
    /// Create an empty bag (start of enumeration)
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an opaque token. An empty input decodes to an empty bag, not
    /// an error; any other decode failure is a non-retryable caller error.
    pub fn unmarshal(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }
        let states: Vec<PageState> = serde_json::from_str(token)
            .map_err(|e| Error::invalid_page_token(e.to_string()))?;
        Ok(Self { states })
    }

    /// Encode the bag. An empty bag encodes to an empty string, the
    /// enumeration-complete signal.
    pub fn marshal(&self) -> Result<String> {
        if self.states.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&self.states)?)
    }

    /// Whether the stack has no frames
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of frames on the stack
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// The innermost frame, or None when the stack is empty
    pub fn current(&self) -> Option<&PageState> {
        self.states.last()
    }

    /// Push a new innermost frame
    pub fn push(&mut self, state: PageState) {
        self.states.push(state);
    }

    /// Pop the innermost frame (its enumeration is exhausted)
    pub fn pop(&mut self) -> Option<PageState> {
        self.states.pop()
    }

    /// Advance the innermost frame: an empty provider token pops it,
    /// otherwise the frame's cursor is replaced and the frame stays.
    pub fn next(&mut self, provider_token: &str) {
        if provider_token.is_empty() {
            self.states.pop();
        } else if let Some(state) = self.states.last_mut() {
            state.token = provider_token.to_string();
        }
    }

    /// Cursor of the innermost frame, or "" when the stack is empty
    pub fn page_token(&self) -> &str {
        self.current().map_or("", |s| s.token.as_str())
    }

    /// Resource kind of the innermost frame, or "" when the stack is empty
    pub fn resource_kind(&self) -> &str {
        self.current().map_or("", |s| s.resource_kind.as_str())
    }
}

// ============================================================================
// Offset Arithmetic
// ============================================================================

/// Compute the next offset cursor for a v1 offset-paginated endpoint.
///
/// The next offset is the previous offset plus the number of items the page
/// returned. A sum of zero is the explicit empty-next signal. A token that
/// does not parse as an integer counts as offset zero.
pub fn increment_offset(page_token: &str, count: usize) -> String {
    let offset: usize = page_token.parse().unwrap_or(0);
    let next = offset + count;
    if next == 0 {
        return String::new();
    }
    next.to_string()
}
