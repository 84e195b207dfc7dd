//! # Runtime Configuration
//!
//! Loaded in two layers:
//!
//! 1. JSON file named by `NW_CONFIG` (optional, every field defaulted)
//! 2. Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NW_HTTP_PORT` | `gateway.http.port` |
//! | `NW_EXCHANGE_TIMEOUT_MS` | `gateway.exchange.timeout` |
//! | `NW_FEEDS_CONFIG` | `feeds_path` |
//! | `NW_MODERATION_WORDS` | `moderation_words_path` |
//! | `NW_TOPIC_*` | `topics` |

use nw_01_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use shared_bus::ExchangeTopics;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub gateway: GatewayConfig,
    pub topics: ExchangeTopics,
    /// RSS feeds file. No file, no ingestion.
    pub feeds_path: Option<PathBuf>,
    /// Moderation word list. No file, every comment passes.
    pub moderation_words_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// File named by `NW_CONFIG` (if any), then process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("NW_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides resolved by `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("NW_HTTP_PORT") {
            self.gateway.http.port = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "NW_HTTP_PORT",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("NW_EXCHANGE_TIMEOUT_MS") {
            let millis: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "NW_EXCHANGE_TIMEOUT_MS",
                value: value.clone(),
            })?;
            self.gateway.exchange.timeout = Duration::from_millis(millis);
        }

        if let Some(value) = lookup("NW_FEEDS_CONFIG") {
            self.feeds_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("NW_MODERATION_WORDS") {
            self.moderation_words_path = Some(PathBuf::from(value));
        }

        self.topics = self.topics.with_overrides(&lookup);
        Ok(self)
    }
}
