// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # confluence-sync
//!
//! Identity and access connector for Confluence Cloud: enumerates users,
//! groups, spaces, and permission grants through paginated, restartable
//! listings, and applies membership and space-permission writes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use confluence_sync::config::ConnectorConfig;
//! use confluence_sync::connector::{drive_entities, Connector};
//!
//! #[tokio::main]
//! async fn main() -> confluence_sync::Result<()> {
//!     let config = ConnectorConfig::from_yaml_file("config.yaml")?;
//!     let connector = Connector::new(&config)?;
//!     connector.validate().await?;
//!
//!     let users = connector.user_syncer();
//!     let records = drive_entities(&users, None, 50, true).await?;
//!     println!("{} users", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Connector (syncers)                      │
//! │  users │ groups │ spaces   — list / entitlements / grants   │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                          │
//! ┌───────────────┴──────────┐  ┌────────────┴────────────────┐
//! │   Pagination (TokenBag)  │  │   Typed client + HTTP core  │
//! │ frame stack, offset and  │  │ auth, throttle, rate-limit  │
//! │ cursor token arithmetic  │  │ classification, backoff     │
//! └──────────────────────────┘  └─────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Page token stacks and offset arithmetic
pub mod pagination;

/// HTTP execution with throttling and rate-limit handling
pub mod http;

/// Typed Confluence API client
pub mod client;

/// Connector configuration
pub mod config;

/// Enumeration façade and per-kind syncers
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
