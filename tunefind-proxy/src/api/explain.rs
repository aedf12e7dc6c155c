//! Lyric explanation endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::required;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub full_lyrics: Option<String>,
    pub selected_line: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// POST /api/explain-lyric
pub async fn explain_lyric(
    State(state): State<AppState>,
    body: Result<Json<ExplainRequest>, JsonRejection>,
) -> ApiResult<Json<ExplainResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    const MISSING: &str = "Need full_lyrics and selected_line";
    let full_lyrics = required(request.full_lyrics, MISSING)?;
    let selected_line = required(request.selected_line, MISSING)?;

    let explanation = state.llm.explain(&full_lyrics, &selected_line).await?;
    Ok(Json(ExplainResponse { explanation }))
}

pub fn explain_routes() -> Router<AppState> {
    Router::new().route("/api/explain-lyric", post(explain_lyric))
}
