//! # SLE Dashboard Main Entry Point
//!
//! Loads configuration, wires up telemetry and the upstream API client, and
//! starts the HTTP server.

use std::sync::Arc;

use sle_dashboard::{
    config::ConfigLoader, server::run_server, telemetry, upstream::http::HttpUpstreamClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, config = %redacted_json, "configuration loaded");
    }

    // One upstream client for the whole process: a single reqwest connection
    // pool and a create-once org-id cache (see upstream::http).
    let upstream = Arc::new(HttpUpstreamClient::from_config(&config)?);

    run_server(config, upstream).await
}
