//! Page token codec
//!
//! Every listing call accepts and returns an opaque page token. Internally a
//! token is a stack of [`PageState`] frames: the bottom frame is the
//! outermost enumeration and the top frame is the one currently being
//! driven. Single-level listings use a one-frame stack; the derived
//! group-to-member user enumeration interleaves two levels on the same
//! stack.
//!
//! An empty token means "start of enumeration"; a stack that drains to empty
//! marshals back to an empty token, which is the termination signal.

mod types;

#[cfg(test)]
mod tests;

pub use types::{increment_offset, PageState, TokenBag};
