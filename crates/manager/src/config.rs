// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//! Environment variables (see [`crate::env`]) override file values.

use crate::env;
use crate::template::{TemplateError, UrlTemplate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use wsman_state::CacheConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid workspace port url template: {0}")]
    Template(#[from] TemplateError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Namespace holding the workspace objects
    pub namespace: String,
    /// Host substituted for `{{ .Host }}` in port URLs
    pub ingress_host: String,
    /// URL template for public ports; no URLs are reported without one
    pub workspace_port_url_template: Option<String>,
    pub operation_timeout_ms: u64,
    /// Full cache relist interval; 0 disables periodic relists
    pub resync_period_ms: u64,
    pub status_channel_capacity: usize,
    pub slow_handler_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            ingress_host: "localhost".to_string(),
            workspace_port_url_template: None,
            operation_timeout_ms: 10_000,
            resync_period_ms: 0,
            status_channel_capacity: 64,
            slow_handler_ms: 100,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `WSMAN_CONFIG` (or defaults when unset), then apply
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::config_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(namespace) = env::namespace() {
            self.namespace = namespace;
        }
        if let Some(timeout) = env::operation_timeout() {
            self.operation_timeout_ms = timeout.as_millis() as u64;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".into()));
        }
        if self.operation_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "operation_timeout_ms must be positive".into(),
            ));
        }
        if self.status_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "status_channel_capacity must be positive".into(),
            ));
        }
        self.url_template()?;
        Ok(())
    }

    pub fn url_template(&self) -> Result<Option<UrlTemplate>, TemplateError> {
        self.workspace_port_url_template
            .as_deref()
            .map(UrlTemplate::parse)
            .transpose()
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn resync_period(&self) -> Option<Duration> {
        (self.resync_period_ms > 0).then(|| Duration::from_millis(self.resync_period_ms))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            namespace: self.namespace.clone(),
            resync_period: self.resync_period(),
            slow_handler: Duration::from_millis(self.slow_handler_ms),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
