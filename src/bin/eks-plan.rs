// Copyright (c) 2025 - Cowboy AI, Inc.
//! EKS Plan - dry run of a provisioning tree
//!
//! Loads and validates the configuration tree, runs the orchestrator
//! against the in-memory recording provisioner and prints the ordered call
//! log plus the run report as JSON on stdout.
//!
//! Run with: EKS_CLUSTERS_CONFIG_PATH=./clusters cargo run --bin eks-plan
//!
//! Ctrl-C stops the run before the next provisioner call.

use anyhow::{Context, Result};
use eks_orchestrator::{ConfigLoader, EngineConfig, Orchestrator, RecordingProvisioner};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = EngineConfig::from_env().context("Failed to read engine configuration")?;
    info!("Configuration loaded:");
    info!("  - Root: {}", config.root_dir.display());
    info!("  - Min size floor: {}", config.validation.min_size_floor.value());
    info!("  - Run policy: {:?}", config.run_policy);

    let plan = ConfigLoader::from_config(&config)
        .load_plan(&config.root_dir)
        .with_context(|| format!("Failed to load {}", config.root_dir.display()))?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping before the next call");
            signal_token.cancel();
        }
    });

    let provisioner = Arc::new(RecordingProvisioner::new());
    let orchestrator = Orchestrator::new(provisioner.clone()).with_policy(config.run_policy);
    let outcome = orchestrator.execute(&cancel, &plan).await;

    let output = json!({
        "calls": provisioner.calls(),
        "report": outcome.report,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render call log")?
    );

    if let Some(err) = outcome.error {
        return Err(err).context("Provisioning run failed");
    }

    info!("Dry run complete");
    Ok(())
}
