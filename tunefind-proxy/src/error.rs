//! Error types for tunefind-proxy
//!
//! Every failure reaches the caller as an HTTP status with a short JSON body;
//! none terminates the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CatalogError, UpstreamError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input; no upstream call was made (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Proxy path rejected by the path policy (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Credential exchange failed (502)
    #[error("Authentication with upstream failed: {0}")]
    Auth(#[from] AuthError),

    /// Upstream call failed (502, or 504 on timeout)
    #[error("Upstream error: {0}")]
    Upstream(UpstreamError),

    /// 401 persisted after one refresh and retry (502)
    #[error("Upstream rejected the refreshed credential")]
    UnauthorizedRetryExhausted,

    /// Route's upstream credential is not configured (500)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        if matches!(err, UpstreamError::NotConfigured { .. }) {
            ApiError::Config(err.to_string())
        } else {
            ApiError::Upstream(err)
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Auth(e) => ApiError::Auth(e),
            CatalogError::Upstream(e) => e.into(),
            CatalogError::UnauthorizedRetryExhausted => ApiError::UnauthorizedRetryExhausted,
            CatalogError::PathRejected(path) => ApiError::Forbidden(format!("Proxy path not allowed: {}", path)),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) | ApiError::UnauthorizedRetryExhausted => StatusCode::BAD_GATEWAY,
            ApiError::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Auth(_) => "AUTH_ERROR",
            ApiError::Upstream(UpstreamError::Timeout { .. }) => "UPSTREAM_TIMEOUT",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::UnauthorizedRetryExhausted => "UNAUTHORIZED_RETRY_EXHAUSTED",
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Caller-facing message; upstream bodies stay in the logs
    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Forbidden(msg) => msg.clone(),
            ApiError::Auth(_) => "Failed to authenticate with upstream".to_string(),
            ApiError::Upstream(UpstreamError::Status { service, status, .. }) => {
                format!("Failed to fetch from {} (status {})", service, status)
            }
            ApiError::Upstream(UpstreamError::Timeout { service }) => {
                format!("{} did not respond in time", service)
            }
            ApiError::Upstream(UpstreamError::Unauthorized { service }) => {
                format!("{} rejected the request credential", service)
            }
            ApiError::Upstream(_) => "Failed to reach upstream".to_string(),
            ApiError::UnauthorizedRetryExhausted => {
                "Upstream rejected the credential after refresh".to_string()
            }
            ApiError::Config(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
