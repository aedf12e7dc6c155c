//! HTTP API handlers for tunefind-proxy

pub mod explain;
pub mod health;
pub mod lyrics;
pub mod news;
pub mod spotify;

pub use explain::{explain_lyric, explain_routes};
pub use health::{health_check, health_routes};
pub use lyrics::{get_lyrics, lyrics_routes};
pub use news::{get_music_news, news_routes};
pub use spotify::{new_releases, proxy_resource, search, spotify_routes};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::services::Relayed;

/// Relayed upstream bodies go out as 200 with the upstream content type
impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let content_type = self
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

/// Require a non-blank parameter
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
