//! # Configuration
//!
//! Static dispatcher configuration, plus loading of handler tables from
//! YAML, TOML or JSON files.
//!
//! ## Environment Variables
//!
//! ### `AJAX_DISPATCH_DISCRIMINATOR`
//!
//! Name of the request parameter whose value selects the handler.
//!
//! Default: `action`
//!
//! ## Config Files
//!
//! ```yaml
//! discriminator: action
//! handlers:
//!   GET:
//!     list: Items@list
//!     show: [Items@show, id]
//!   POST:
//!     save: [Items@save, name, price]
//! ```
//!
//! The same document in TOML:
//!
//! ```toml
//! discriminator = "action"
//!
//! [handlers.GET]
//! list = "Items@list"
//! show = ["Items@show", "id"]
//! ```

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::HandlerRegistry;

/// Discriminator used when none is configured.
pub const DEFAULT_DISCRIMINATOR: &str = "action";

/// Static settings of a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Request parameter whose value selects the handler
    pub discriminator: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            discriminator: DEFAULT_DISCRIMINATOR.to_string(),
        }
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
        }
    }

    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let discriminator = match env::var("AJAX_DISPATCH_DISCRIMINATOR") {
            Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
            _ => DEFAULT_DISCRIMINATOR.to_string(),
        };
        DispatcherConfig { discriminator }
    }
}

/// A dispatch configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Overrides the default discriminator when present
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Method → discriminator value → handler, validated by [`DispatchConfig::registry`]
    #[serde(default = "empty_table")]
    pub handlers: Value,
}

fn empty_table() -> Value {
    Value::Object(serde_json::Map::new())
}

impl DispatchConfig {
    /// Dispatcher settings, falling back to the defaults.
    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        self.discriminator
            .clone()
            .map(DispatcherConfig::new)
            .unwrap_or_default()
    }

    /// Validate the handler table.
    pub fn registry(&self) -> Result<HandlerRegistry> {
        HandlerRegistry::from_value(self.handlers.clone()).context("invalid handler table")
    }

    /// Parse a document, choosing the format from the file extension.
    pub fn parse(content: &str, extension: &str) -> Result<Self> {
        let config = match extension {
            "yaml" | "yml" => serde_yaml::from_str(content).context("invalid YAML config")?,
            "toml" => toml::from_str(content).context("invalid TOML config")?,
            "json" => serde_json::from_str(content).context("invalid JSON config")?,
            other => anyhow::bail!("unsupported config format '{other}' (use yaml, toml or json)"),
        };
        Ok(config)
    }
}

/// Load a dispatch configuration from a `.yaml`/`.yml`, `.toml` or `.json` file.
pub fn load_config(path: impl AsRef<Path>) -> Result<DispatchConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    DispatchConfig::parse(&content, &extension)
        .with_context(|| format!("failed to load config {}", path.display()))
}
