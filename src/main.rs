//! # Review Collector Main Entry Point
//!
//! Loads configuration, initializes telemetry and the database, then serves the API.

use anyhow::Context;
use review_collector::{
    config::ConfigLoader,
    db::{init_pool, run_migrations},
    server::run_server,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;
    run_migrations(&db).await?;

    run_server(config, db).await
}
