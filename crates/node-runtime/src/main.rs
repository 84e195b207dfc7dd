//! # Newswire Node
//!
//! Binary entry point: telemetry, configuration, run until Ctrl+C.

use anyhow::{Context, Result};
use node_runtime::container::RuntimeConfig;
use node_runtime::NodeRuntime;
use nw_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialise logging")?;

    let config = RuntimeConfig::load().context("Failed to load configuration")?;

    let mut runtime = NodeRuntime::new(config).context("Failed to build services")?;
    runtime.start().await.context("Failed to start node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
