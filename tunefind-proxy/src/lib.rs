//! tunefind-proxy library interface
//!
//! Credential-hiding proxy between the Tunefind web client and its upstream
//! services (music catalog, lyrics, news, LLM).

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use serde::Serialize;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tunefind_common::config::{Secrets, ServiceConfig};

use crate::services::{
    upstream::build_http_client, CatalogClient, LlmClient, LyricsClient, NewsClient, TokenManager,
    UpstreamError,
};

/// Build identification captured by build.rs
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("TUNEFIND_GIT_HASH"),
    built_at: env!("TUNEFIND_BUILT_AT"),
    profile: env!("TUNEFIND_BUILD_PROFILE"),
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog credential cache, shared with `catalog`
    pub tokens: Arc<TokenManager>,
    pub catalog: Arc<CatalogClient>,
    pub lyrics: Arc<LyricsClient>,
    pub news: Arc<NewsClient>,
    pub llm: Arc<LlmClient>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the upstream clients from resolved configuration
    pub fn new(config: &ServiceConfig, secrets: Secrets) -> Result<Self, UpstreamError> {
        let http_client = build_http_client(config.upstream_timeout)?;
        let upstream = &config.upstream;

        let tokens = Arc::new(TokenManager::new(
            http_client.clone(),
            upstream.token_url.clone(),
            secrets.client_id,
            secrets.client_secret,
        ));

        let catalog = Arc::new(CatalogClient::new(
            http_client.clone(),
            &upstream.catalog_base_url,
            Arc::clone(&tokens),
            config.proxy_allowed_prefixes.clone(),
        ));

        Ok(Self {
            tokens,
            catalog,
            lyrics: Arc::new(LyricsClient::new(http_client.clone(), &upstream.lyrics_base_url)),
            news: Arc::new(NewsClient::new(
                http_client.clone(),
                &upstream.news_url,
                secrets.news_api_key,
            )),
            llm: Arc::new(LlmClient::new(
                http_client,
                &upstream.llm_url,
                &config.llm_model,
                secrets.llm_api_key,
            )),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::spotify_routes())
        .merge(api::lyrics_routes())
        .merge(api::news_routes())
        .merge(api::explain_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Browser client is served from a different origin
        .layer(CorsLayer::permissive())
}
