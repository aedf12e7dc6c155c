//! Catalog endpoints
//!
//! - `GET /api/spotify/search` - album/playlist/track search
//! - `GET /api/spotify/proxy` - passthrough GET of a catalog path
//! - `GET /api/spotify/new-releases` - new album releases

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::services::{Relayed, SearchParams};
use crate::AppState;

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_RELEASES_LIMIT: u32 = 20;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text search
    pub query: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Query parameters for the passthrough proxy
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    /// Catalog path relative to the API base, e.g. `tracks/abc123`
    pub query: Option<String>,
}

/// Query parameters for new releases
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_releases_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_releases_limit() -> u32 {
    DEFAULT_RELEASES_LIMIT
}

/// GET /api/spotify/search?query=...&limit=10&offset=0
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Relayed> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let search = SearchParams {
        query: required(params.query, "Query is required")?,
        limit: params.limit,
        offset: params.offset,
    };

    Ok(state.catalog.search(&search).await?)
}

/// GET /api/spotify/proxy?query=tracks/abc123
pub async fn proxy_resource(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> ApiResult<Relayed> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let path = required(params.query, "Query is required")?;

    Ok(state.catalog.resource(&path).await?)
}

/// GET /api/spotify/new-releases?limit=20&offset=0
pub async fn new_releases(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Relayed> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    Ok(state.catalog.new_releases(params.limit, params.offset).await?)
}

/// Build catalog routes
pub fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/api/spotify/search", get(search))
        .route("/api/spotify/proxy", get(proxy_resource))
        .route("/api/spotify/new-releases", get(new_releases))
}
