//! Process identity stamped on every envelope and log line.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use uuid::Uuid;

/// Identity of one running service instance.
///
/// Built once at startup and handed to every component that tags envelopes
/// or logs. Never looked up from globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// Logical service name (gateway, news, comments, moderation)
    pub service: String,
    /// Host the process runs on
    pub host: String,
    /// Unique per process start
    pub instance: Uuid,
}

impl ServiceIdentity {
    pub fn new(service: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            host: host.into(),
            instance: Uuid::new_v4(),
        }
    }

    /// Create an identity from environment variables.
    ///
    /// - `NW_SERVICE_NAME`: overrides `default_service`
    /// - `HOSTNAME`: host part (default: localhost)
    pub fn from_env(default_service: &str) -> Self {
        let service = env::var("NW_SERVICE_NAME").unwrap_or_else(|_| default_service.to_string());
        let host = env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        Self::new(service, host)
    }

    /// Same host and instance, different logical service.
    pub fn for_service(&self, service: &str) -> Self {
        Self {
            service: service.to_string(),
            host: self.host.clone(),
            instance: self.instance,
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.service, self.host)
    }
}
