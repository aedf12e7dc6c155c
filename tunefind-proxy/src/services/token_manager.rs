//! Catalog access token cache
//!
//! Acquires a bearer token with the OAuth2 client-credentials grant and keeps
//! it until `expires_at`. Handlers read the cached credential concurrently;
//! refreshes are serialized so a burst of requests on a cold or expired cache
//! performs one exchange.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use super::upstream::error_body;

/// Token exchange errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token endpoint unreachable: {0}")]
    Network(String),

    #[error("Token endpoint timed out")]
    Timeout,

    #[error("Token exchange rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Token response could not be parsed: {0}")]
    Parse(String),
}

/// Cached bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// True once `expires_at` is at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Whether a usable credential is cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Unauthenticated,
    Authenticated,
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: i64,
}

/// Client-credentials token manager
pub struct TokenManager {
    http_client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    credential: RwLock<Option<Credential>>,
    /// Held for the duration of an exchange
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        http_client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http_client,
            token_url,
            client_id,
            client_secret,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// True if no credential was ever fetched or the cached one has expired
    pub async fn is_expired(&self) -> bool {
        match &*self.credential.read().await {
            Some(credential) => credential.is_expired_at(Utc::now()),
            None => true,
        }
    }

    pub async fn state(&self) -> TokenState {
        if self.is_expired().await {
            TokenState::Unauthenticated
        } else {
            TokenState::Authenticated
        }
    }

    /// Perform a token exchange unconditionally and cache the result
    ///
    /// On failure the previously cached credential is left in place.
    pub async fn refresh(&self) -> Result<Credential, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        self.exchange_and_store().await
    }

    /// Return a non-expired credential, exchanging first if needed
    pub async fn ensure_valid(&self) -> Result<Credential, AuthError> {
        if let Some(credential) = self.current().await {
            return Ok(credential);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited
        if let Some(credential) = self.current().await {
            return Ok(credential);
        }

        self.exchange_and_store().await
    }

    /// Replace a credential the upstream rejected
    ///
    /// Skips the exchange only when a different, still valid token was cached
    /// after `rejected` was handed out.
    pub async fn force_refresh(&self, rejected: &str) -> Result<Credential, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(credential) = self.current().await {
            if credential.token != rejected {
                tracing::debug!("Credential already replaced by a concurrent refresh");
                return Ok(credential);
            }
        }

        self.exchange_and_store().await
    }

    async fn current(&self) -> Option<Credential> {
        self.credential
            .read()
            .await
            .as_ref()
            .filter(|c| !c.is_expired_at(Utc::now()))
            .cloned()
    }

    async fn exchange_and_store(&self) -> Result<Credential, AuthError> {
        let credential = self.exchange().await?;
        *self.credential.write().await = Some(credential.clone());
        Ok(credential)
    }

    async fn exchange(&self) -> Result<Credential, AuthError> {
        tracing::debug!(url = %self.token_url, "Requesting client-credentials token");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout
                } else {
                    AuthError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            tracing::error!(status = status.as_u16(), "Token exchange rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let ttl = ChronoDuration::seconds(token.expires_in.max(0));
        let credential = Credential {
            token: token.access_token,
            expires_at: Utc::now() + ttl,
        };

        tracing::info!(
            expires_in = token.expires_in,
            expires_at = %credential.expires_at,
            "Access token fetched successfully"
        );

        Ok(credential)
    }
}
