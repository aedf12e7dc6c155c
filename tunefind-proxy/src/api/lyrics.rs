//! Lyrics endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::services::Relayed;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LyricsQuery {
    pub artist: Option<String>,
    pub title: Option<String>,
}

/// GET /api/lyrics?artist=...&title=...
pub async fn get_lyrics(
    State(state): State<AppState>,
    query: Result<Query<LyricsQuery>, QueryRejection>,
) -> ApiResult<Relayed> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    const MISSING: &str = "Artist and title are required";
    let artist = required(params.artist, MISSING)?;
    let title = required(params.title, MISSING)?;

    Ok(state.lyrics.lookup(&artist, &title).await?)
}

pub fn lyrics_routes() -> Router<AppState> {
    Router::new().route("/api/lyrics", get(get_lyrics))
}
