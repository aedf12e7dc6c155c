//! Shared plumbing for outbound HTTP calls
//!
//! Every upstream client builds its `reqwest::Client` here so all calls carry
//! the same user agent and an explicit timeout.

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("Tunefind/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body kept for logs and error messages
const MAX_ERROR_BODY: usize = 512;

/// Upstream call errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} rejected the credential (401)")]
    Unauthorized { service: &'static str },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} timed out")]
    Timeout { service: &'static str },

    #[error("{service} request failed: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service} response could not be parsed: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("{service} URL is invalid: {message}")]
    InvalidUrl {
        service: &'static str,
        message: String,
    },

    #[error("{service} is not configured: {missing} is unset")]
    NotConfigured {
        service: &'static str,
        missing: &'static str,
    },
}

impl UpstreamError {
    /// Classify a transport-level reqwest failure
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { service }
        } else {
            UpstreamError::Network {
                service,
                message: err.to_string(),
            }
        }
    }
}

/// Upstream body relayed to the caller without reshaping
#[derive(Debug, Clone)]
pub struct Relayed {
    /// Upstream `Content-Type`, if it sent one
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Build the HTTP client used for one upstream
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Network {
            service: "http client",
            message: e.to_string(),
        })
}

/// Turn an upstream response into a relayable body or an error
///
/// 401 is reported separately so the catalog client can refresh and retry.
pub async fn relay(
    service: &'static str,
    response: reqwest::Response,
) -> Result<Relayed, UpstreamError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(UpstreamError::Unauthorized { service });
    }

    if !status.is_success() {
        let body = error_body(response).await;
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| UpstreamError::from_reqwest(service, e))?;

    Ok(Relayed { content_type, body })
}

/// Read an error body, truncated for logging
pub async fn error_body(response: reqwest::Response) -> String {
    let mut text = response.text().await.unwrap_or_default();
    if text.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
