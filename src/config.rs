//! Connector configuration
//!
//! Loaded from a YAML file, with individual fields overridable by CLI
//! flags. The permission verb/noun allow-lists are immutable configuration
//! injected at construction; they are validated here against the process
//! defaults rather than being mutated anywhere at runtime.

use crate::error::{Error, Result};
use crate::http::ThrottleConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Space permission target nouns accepted by the provider
pub const DEFAULT_NOUNS: &[&str] = &["attachment", "blogpost", "comment", "page", "space"];

/// Space permission verbs accepted by the provider
pub const DEFAULT_VERBS: &[&str] = &[
    "administer",
    "archive",
    "create",
    "delete",
    "export",
    "read",
    "restrict_content",
    "update",
];

fn default_page_size() -> u32 {
    50
}

/// Complete connector configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Account username (email) for basic auth
    pub username: String,

    /// API key for basic auth
    pub api_key: String,

    /// Instance domain, e.g. "example.atlassian.net"; a scheme may be
    /// included to override https
    pub domain_url: String,

    /// Skip personal spaces and their permissions
    #[serde(default)]
    pub skip_personal_spaces: bool,

    /// Permission nouns to sync; empty means all defaults
    #[serde(default)]
    pub nouns: Vec<String>,

    /// Permission verbs to sync; empty means all defaults
    #[serde(default)]
    pub verbs: Vec<String>,

    /// Requested page size for listings (clamped to the provider maximum)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Client-side throttle; None disables it
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
}

impl ConnectorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Check that all required fields are present
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::missing_field("username"));
        }
        if self.api_key.is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        if self.domain_url.is_empty() {
            return Err(Error::missing_field("domain_url"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("username", &self.username)
            .field("api_key", &"***")
            .field("domain_url", &self.domain_url)
            .field("skip_personal_spaces", &self.skip_personal_spaces)
            .field("nouns", &self.nouns)
            .field("verbs", &self.verbs)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Validate requested allow-list values against the defaults, preserving
/// default order. Empty input selects every default; an unknown value is a
/// configuration error.
pub fn filter_allowed(field: &str, requested: &[String], defaults: &[&str]) -> Result<Vec<String>> {
    for value in requested {
        if !defaults.contains(&value.as_str()) {
            return Err(Error::InvalidConfigValue {
                field: field.to_string(),
                message: format!("unknown value '{value}'"),
            });
        }
    }

    if requested.is_empty() {
        return Ok(defaults.iter().map(ToString::to_string).collect());
    }

    let selected: Vec<String> = defaults
        .iter()
        .filter(|default| requested.iter().any(|value| value == *default))
        .map(ToString::to_string)
        .collect();

    // Requested values were all validated above, so this cannot be empty,
    // but a wrong allow-list here would sync nothing.
    if selected.is_empty() {
        return Err(Error::InvalidConfigValue {
            field: field.to_string(),
            message: "no valid values selected".to_string(),
        });
    }

    Ok(selected)
}
