//! # Host Agent
//!
//! Per-host sidecar: removes containers the metadata service no longer
//! accounts for, stops surplus metadata/DNS instances, and dispatches
//! container lifecycle events (including a replay of containers that predate
//! the agent) to the handler pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use agent_runtime::handlers::TracingHandler;
use agent_runtime::{logging, AgentConfig, AgentPorts, AgentRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AgentConfig::parse();
    config.validate().context("Invalid configuration")?;

    logging::init(&config.log_level, config.json_logs).context("Failed to initialize logging")?;

    let ports = AgentPorts::connect(&config).context("Failed to connect adapters")?;

    let mut runtime = AgentRuntime::new(config, ports, TracingHandler::registry());
    runtime.start().await.context("Failed to start host agent")?;

    info!("Host agent is running. Press Ctrl+C to stop.");
    wait_for_signal().await?;

    runtime.shutdown().await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl+C")?,
        _ = terminate.recv() => info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")
}
