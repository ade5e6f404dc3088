//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Confluence identity and access sync
#[derive(Parser, Debug)]
#[command(name = "confluence-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate credentials against the instance
    Check,

    /// Enumerate resources, entitlements, and grants
    Sync {
        /// Resource kinds to sync (comma-separated, empty = all)
        #[arg(long)]
        kinds: Option<String>,

        /// Suppress duplicate users reachable through multiple groups
        #[arg(long)]
        dedupe_users: bool,

        /// Requested page size (clamped to the provider maximum)
        #[arg(long)]
        page_size: Option<u32>,

        /// Skip entitlement and grant expansion, list resources only
        #[arg(long)]
        resources_only: bool,
    },

    /// Show the connector's configuration specification
    Spec,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
