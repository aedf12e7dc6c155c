//! Music news endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::services::news_client::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::services::Relayed;
use crate::AppState;

/// Pagination as sent by the web client
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(rename = "pageSize", default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// GET /api/music-news?page=1&pageSize=20
pub async fn get_music_news(
    State(state): State<AppState>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> ApiResult<Relayed> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    Ok(state.news.music_news(params.page, params.page_size).await?)
}

pub fn news_routes() -> Router<AppState> {
    Router::new().route("/api/music-news", get(get_music_news))
}
