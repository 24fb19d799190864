//! HTTP server for veracityd

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use veracity_core::{Aggregator, VerificationCache, VerifierConfig};

use crate::routes;

/// Application state shared across handlers
pub struct AppState {
    pub aggregator: Aggregator,
    pub cache: Arc<VerificationCache>,
    pub config: VerifierConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        aggregator: Aggregator,
        cache: Arc<VerificationCache>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            aggregator,
            cache,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: AppState) -> Result<()> {
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::verify_routes())
        .merge(routes::cache_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Bind to localhost only; the daemon sits behind the service gateway.
    let addr = "127.0.0.1:7470";
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
