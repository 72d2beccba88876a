// src/config.rs
//! Connection settings for the upstream feed/read-state store.
//!
//! Resolution order: environment variables, then `config/upstream.toml`,
//! then built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const ENV_UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";

pub const DEFAULT_CONFIG_PATH: &str = "config/upstream.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Bounded timeout around upstream calls so one slow store cannot stall
/// a whole aggregation indefinitely.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading upstream config from {}", path.display()))?;
        let cfg = toml::from_str(&content)
            .with_context(|| format!("parsing upstream config from {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolve the effective config. A broken config file degrades to
    /// defaults with a warning rather than refusing to boot.
    pub fn resolve() -> Self {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let mut cfg = if path.exists() {
            Self::load_from(path).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, "upstream config file unreadable, using defaults");
                Self::default()
            })
        } else {
            Self::default()
        };

        if let Ok(v) = std::env::var(ENV_UPSTREAM_BASE_URL) {
            let v = v.trim();
            if !v.is_empty() {
                cfg.base_url = v.to_string();
            }
        }
        if let Some(t) = std::env::var(ENV_UPSTREAM_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            cfg.timeout_secs = t;
        }

        cfg
    }
}
