//! Veracity Daemon - claim verification service
//!
//! Loads configuration, builds the verification engine, and serves the
//! HTTP API on localhost.

mod routes;
mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use veracity_core::{Aggregator, VerificationCache, VerifierConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Veracity Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = VerifierConfig::load()?;
    if config.factcheck.api_key.is_none() {
        info!("No fact-check API key configured; authoritative stage disabled");
    }
    if !config.llm.credential_configured() {
        info!("LLM fallback disabled");
    }

    let cache = Arc::new(VerificationCache::new(Duration::from_secs(
        config.cache.ttl_secs,
    )));
    let aggregator = Aggregator::from_config(&config, cache.clone())?;

    let state = server::AppState::new(aggregator, cache, config);
    server::run(state).await
}
