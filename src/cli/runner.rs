//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConnectorConfig;
use crate::connector::{drive_entities, Connector, ListPage, PageToken, ResourceSyncer};
use crate::error::{Error, Result};
use crate::types::ResourceKind;
use serde_json::{json, Value};
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Sync {
                kinds,
                dedupe_users,
                page_size,
                resources_only,
            } => {
                self.sync(
                    kinds.as_deref(),
                    *dedupe_users,
                    page_size.unwrap_or(0),
                    *resources_only,
                )
                .await
            }
            Commands::Spec => self.spec(),
        }
    }

    /// Load configuration from the file named on the command line
    fn load_config(&self) -> Result<ConnectorConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;
        ConnectorConfig::from_yaml_file(path)
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let connector = Connector::new(&config)?;

        match connector.validate().await {
            Ok(verdict) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful",
                        "rateLimitRemaining": verdict.remaining
                    }
                }));
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
            }
        }

        Ok(())
    }

    /// Enumerate resources, entitlements, and grants
    async fn sync(
        &self,
        kinds: Option<&str>,
        dedupe_users: bool,
        page_size: u32,
        resources_only: bool,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;
        let connector = Connector::new(&config)?;

        let requested = if page_size == 0 {
            config.page_size
        } else {
            page_size
        };
        let kind_filter: Option<Vec<&str>> = kinds.map(|s| s.split(',').map(str::trim).collect());

        let mut kind_results: Vec<Value> = Vec::new();
        let mut total_records = 0usize;

        for syncer in connector.syncers() {
            let kind = syncer.resource_kind();
            if let Some(ref filter) = kind_filter {
                if !filter.contains(&kind.as_str()) {
                    continue;
                }
            }

            let kind_start = Instant::now();
            self.output_message(&json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!("Starting sync for resource kind: {kind}")
                }
            }));

            let dedupe = dedupe_users && kind == ResourceKind::User;
            let result = self
                .sync_kind(syncer.as_ref(), requested, dedupe, resources_only)
                .await;

            let duration_ms = kind_start.elapsed().as_millis() as u64;
            match result {
                Ok(count) => {
                    total_records += count;
                    kind_results.push(json!({
                        "kind": kind.as_str(),
                        "status": "SUCCESS",
                        "records_synced": count,
                        "duration_ms": duration_ms
                    }));
                }
                Err(e) => {
                    self.output_message(&json!({
                        "type": "LOG",
                        "log": {
                            "level": "ERROR",
                            "message": format!("Error syncing {kind}: {e}")
                        }
                    }));
                    kind_results.push(json!({
                        "kind": kind.as_str(),
                        "status": "FAILED",
                        "error": e.to_string(),
                        "duration_ms": duration_ms
                    }));
                }
            }
        }

        let failed = kind_results
            .iter()
            .filter(|r| r["status"] == "FAILED")
            .count();
        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": if failed == 0 { "SUCCEEDED" } else { "PARTIAL" },
                "total_records": total_records,
                "duration_ms": sync_start.elapsed().as_millis() as u64,
                "kinds": kind_results
            }
        }));

        Ok(())
    }

    /// Sync one resource kind: its resources, then each resource's
    /// entitlements and grants
    async fn sync_kind(
        &self,
        syncer: &dyn ResourceSyncer,
        page_size: u32,
        dedupe: bool,
        resources_only: bool,
    ) -> Result<usize> {
        let records = drive_entities(syncer, None, page_size, dedupe).await?;
        let mut emitted = records.len();

        for record in &records {
            self.output_message(&json!({
                "type": "RECORD",
                "record": {
                    "kind": record.id.kind.as_str(),
                    "id": record.id.id,
                    "display_name": record.display_name,
                    "profile": record.profile
                }
            }));
        }

        if resources_only {
            return Ok(emitted);
        }

        for record in &records {
            let mut token = PageToken {
                token: String::new(),
                size: page_size,
            };
            loop {
                let page = syncer.entitlements(&record.id, &token).await?;
                for entitlement in &page.records {
                    self.output_message(&json!({
                        "type": "ENTITLEMENT",
                        "entitlement": entitlement
                    }));
                }
                emitted += page.records.len();
                if !Self::advance(&mut token, &page) {
                    break;
                }
            }

            let mut token = PageToken {
                token: String::new(),
                size: page_size,
            };
            loop {
                let page = syncer.grants(&record.id, &token).await?;
                for grant in &page.records {
                    self.output_message(&json!({
                        "type": "GRANT",
                        "grant": grant
                    }));
                }
                emitted += page.records.len();
                if !Self::advance(&mut token, &page) {
                    break;
                }
            }
        }

        Ok(emitted)
    }

    fn advance<T>(token: &mut PageToken, page: &ListPage<T>) -> bool {
        if page.next_token.is_empty() {
            return false;
        }
        token.token = page.next_token.clone();
        true
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "connectionSpecification": {
                    "type": "object",
                    "title": "confluence-sync",
                    "properties": {
                        "username": {"type": "string", "description": "Account email for basic auth"},
                        "api_key": {"type": "string", "secret": true, "description": "API key for basic auth"},
                        "domain_url": {"type": "string", "description": "Instance domain, e.g. example.atlassian.net"},
                        "skip_personal_spaces": {"type": "boolean", "default": false},
                        "nouns": {"type": "array", "items": {"type": "string"}},
                        "verbs": {"type": "array", "items": {"type": "string"}},
                        "page_size": {"type": "integer", "default": 50}
                    },
                    "required": ["username", "api_key", "domain_url"]
                }
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
