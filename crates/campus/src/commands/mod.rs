//! CLI command handlers.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use campus_client::{CampusClient, FileCredentialStore};
use campus_config::{BaseUrls, Settings};
use serde_json::Value;

use crate::notify::{ConsoleNotifier, LoginHint};

pub mod auth;
pub mod request;
pub mod resource;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded settings, with CLI overrides applied.
    pub settings: Settings,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// The on-disk credential store shared by every command.
    pub fn credential_store(&self) -> Result<Arc<FileCredentialStore>> {
        let dir = campus_config::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(Arc::new(FileCredentialStore::in_dir(&dir)))
    }

    /// Build an authenticated client for the selected environment.
    pub fn client(&self) -> Result<CampusClient> {
        let urls = BaseUrls::from_env().context("Base URLs are not configured")?;
        let client = CampusClient::builder_from_settings(&self.settings, &urls)
            .credential_store(self.credential_store()?)
            .notifier(Arc::new(ConsoleNotifier))
            .redirect(Arc::new(LoginHint))
            .build()?;

        tracing::debug!(
            environment = %self.settings.environment,
            base_url = %client.base_url(),
            "Client ready"
        );
        Ok(client)
    }
}

/// Parse a `--data` argument as JSON.
pub fn parse_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--data is not valid JSON: {}", raw))
}

/// Print a JSON value, pretty unless it is a bare string.
pub fn print_value(value: &Value) -> Result<()> {
    match value {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_accepts_objects() {
        let value = parse_json(r#"{"name":"Rust 101","active":true}"#).unwrap();
        assert_eq!(value, json!({ "name": "Rust 101", "active": true }));
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        let err = parse_json("{name:").unwrap_err();
        assert!(err.to_string().contains("--data is not valid JSON"));
    }
}
