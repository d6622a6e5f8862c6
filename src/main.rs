use crate::config::WikiConfig;
use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
mod database;
mod domain;
mod error;
mod features;
mod orchestrator;
mod parser;
mod services;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wiki_server=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = WikiConfig::from_env().context("Failed to load configuration")?;

    let deployment = match orchestrator::deploy(&config).await {
        Ok(deployment) => deployment,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return Err(e);
        }
    };

    tracing::info!(
        addr = %deployment.local_addr(),
        instances = deployment.instances(),
        store = deployment.endpoint_address(),
        "wiki is up, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("shutting down");
    deployment.shutdown().await;

    Ok(())
}
