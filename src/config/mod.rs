//! Configuration loading and management

use crate::core::validation::UnknownFields;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Address used when no bind address is configured
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// HTTP server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on (e.g., "0.0.0.0:8080")
    #[serde(default)]
    pub bind: Option<String>,
}

/// Per-collection view settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name, matching the index endpoint (e.g., "workouts")
    #[serde(default)]
    pub name: String,

    /// Default page size of the index
    #[serde(default)]
    pub per_page: Option<usize>,

    /// Upper bound for a client-requested page size
    #[serde(default)]
    pub max_per_page: Option<usize>,

    /// Policy for undeclared fields in form submissions
    #[serde(default)]
    pub unknown_fields: Option<UnknownFields>,
}

impl CollectionConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Overlay the values set in `other`
    fn overlay(&mut self, other: CollectionConfig) {
        if other.per_page.is_some() {
            self.per_page = other.per_page;
        }
        if other.max_per_page.is_some() {
            self.max_per_page = other.max_per_page;
        }
        if other.unknown_fields.is_some() {
            self.unknown_fields = other.unknown_fields;
        }
    }
}

/// Complete configuration of the HAL views
///
/// # Example
///
/// ```yaml
/// server:
///   bind: 127.0.0.1:3000
/// collections:
///   - name: workouts
///     per_page: 2
///     max_per_page: 10
///     unknown_fields: reject
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

impl ViewsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        if let Some(unnamed) = config.collections.iter().position(|c| c.name.is_empty()) {
            anyhow::bail!("collection entry #{} has no name", unnamed + 1);
        }
        Ok(config)
    }

    /// Merge several configurations, later ones taking precedence
    ///
    /// Collections with the same name are merged field by field.
    pub fn merge(configs: Vec<ViewsConfig>) -> Self {
        let mut merged = ViewsConfig::default();
        for config in configs {
            if config.server.bind.is_some() {
                merged.server.bind = config.server.bind;
            }
            for collection in config.collections {
                match merged
                    .collections
                    .iter_mut()
                    .find(|existing| existing.name == collection.name)
                {
                    Some(existing) => existing.overlay(collection),
                    None => merged.collections.push(collection),
                }
            }
        }
        merged
    }

    /// Settings of a collection, if configured
    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn bind_address(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}
