//! API routes for veracityd
//!
//! Structural request validation lives here, at the service boundary: the
//! engine itself never rejects a claim, it only resolves it. Anything that
//! fails validation gets a 400 before the engine is consulted.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use veracity_core::{BatchScheduler, CacheStats, Claim, Verification};

use crate::server::AppState;

type AppStateArc = Arc<AppState>;

/// Largest batch accepted in one request.
const MAX_BATCH_SIZE: usize = 25;

// ============================================================================
// Verification Routes
// ============================================================================

pub fn verify_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/verify", post(verify_one))
        .route("/v1/verify/batch", post(verify_batch))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub claim: Claim,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub verification: Verification,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBatchRequest {
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBatchResponse {
    pub verifications: Vec<Verification>,
    pub cached_count: usize,
}

fn validate_claim(claim: &Claim) -> Result<(), String> {
    if claim.id.trim().is_empty() {
        return Err("claim id must not be empty".to_string());
    }
    if claim.text.trim().is_empty() {
        return Err(format!("claim {} has empty text", claim.id));
    }
    Ok(())
}

async fn verify_one(
    State(state): State<AppStateArc>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, (StatusCode, String)> {
    validate_claim(&req.claim).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let outcome = state.aggregator.verify_one(&req.claim).await;
    Ok(Json(VerifyResponse {
        verification: outcome.verification,
        cached: outcome.cached,
    }))
}

async fn verify_batch(
    State(state): State<AppStateArc>,
    Json(req): Json<VerifyBatchRequest>,
) -> Result<Json<VerifyBatchResponse>, (StatusCode, String)> {
    if req.claims.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "claims must not be empty".to_string()));
    }
    if req.claims.len() > MAX_BATCH_SIZE {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("batch exceeds {} claims", MAX_BATCH_SIZE),
        ));
    }
    for claim in &req.claims {
        validate_claim(claim).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    }

    info!(claims = req.claims.len(), "verifying batch");
    let pacing = Duration::from_millis(state.config.batch.pacing_ms);
    let scheduler = BatchScheduler::new(&state.aggregator, pacing);
    let outcome = scheduler.run(&req.claims).await;

    Ok(Json(VerifyBatchResponse {
        verifications: outcome.verifications,
        cached_count: outcome.cached_count,
    }))
}

// ============================================================================
// Cache Routes
// ============================================================================

pub fn cache_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/cache/stats", get(cache_stats))
        .route("/v1/cache/clear", post(cache_clear))
}

async fn cache_stats(State(state): State<AppStateArc>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared: bool,
}

async fn cache_clear(State(state): State<AppStateArc>) -> Json<CacheClearResponse> {
    state.cache.clear();
    info!("verification cache cleared");
    Json(CacheClearResponse { cleared: true })
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache: state.cache.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_claim() {
        assert!(validate_claim(&Claim::new("c1", "text")).is_ok());
        assert!(validate_claim(&Claim::new("", "text")).is_err());
        assert!(validate_claim(&Claim::new("c1", "   ")).is_err());
    }
}
