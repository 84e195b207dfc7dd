//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for logs
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to log span close events with busy/idle timings
    pub log_spans: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "newswire".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            log_spans: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NW_SERVICE_NAME`: Service name (default: newswire)
    /// - `RUST_LOG` or `NW_LOG_LEVEL`: Log level (default: info)
    /// - `NW_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `NW_LOG_SPANS`: Log span close events (default: false)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("NW_SERVICE_NAME").unwrap_or_else(|_| "newswire".to_string()),

            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("NW_LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("NW_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            log_spans: env::var("NW_LOG_SPANS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Configuration for a named service with everything else from the environment.
    pub fn for_service(service_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = service_name.to_string();
        config
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
