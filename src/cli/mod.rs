//! CLI module
//!
//! Command-line interface for the connector.
//!
//! # Commands
//!
//! - `check` - Validate credentials against the instance
//! - `sync` - Enumerate resources, entitlements, and grants
//! - `spec` - Show the connector's configuration specification

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
