//! Cooling-System Prediction Gateway - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, GatewayConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::load().context("loading configuration")?;
    init_logging(&config.log_level, config.log_format)?;

    info!("=== Cooling Prediction Gateway v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Artifacts: {}", config.artifact_dir.display());

    run_server(config).await
}
