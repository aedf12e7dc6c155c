//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::services::TokenState;
use crate::{AppState, BuildInfo, BUILD_INFO};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub build: BuildInfo,
    /// Whether a catalog token is currently cached
    pub token_state: TokenState,
}

/// GET /health
///
/// Reports cached token state without triggering an exchange.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "tunefind-proxy".to_string(),
        version: BUILD_INFO.version.to_string(),
        uptime_seconds: (Utc::now() - state.startup_time).num_seconds(),
        build: BUILD_INFO,
        token_state: state.tokens.state().await,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
