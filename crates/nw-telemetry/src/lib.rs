//! # Newswire Telemetry
//!
//! Structured logging for every Newswire service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nw_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config).expect("Failed to init telemetry");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NW_SERVICE_NAME` | `newswire` | Service name attached to the root span |
//! | `RUST_LOG` / `NW_LOG_LEVEL` | `info` | Log level filter |
//! | `NW_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `NW_LOG_SPANS` | `false` | Emit span close events with timings |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_env_filter, init_telemetry};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}
