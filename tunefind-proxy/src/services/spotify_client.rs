//! Music catalog (Spotify Web API) client
//!
//! All calls carry the bearer token from [`TokenManager`]. A 401 moves the
//! request from [`Attempt::Initial`] to [`Attempt::Retried`] after one forced
//! refresh; a 401 on the retried attempt is final.

use std::sync::Arc;
use thiserror::Error;

use super::token_manager::{AuthError, TokenManager};
use super::upstream::{relay, Relayed, UpstreamError};

const SERVICE: &str = "catalog";

/// Result categories requested from catalog search
pub const SEARCH_TYPES: &str = "album,playlist,track";

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Catalog rejected the credential again after refresh")]
    UnauthorizedRetryExhausted,

    #[error("Proxy path not allowed: {0}")]
    PathRejected(String),
}

/// Search request descriptor
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
}

/// Per-request retry state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retried,
}

/// Catalog API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    allowed_prefixes: Vec<String>,
}

impl CatalogClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        tokens: Arc<TokenManager>,
        allowed_prefixes: Vec<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            allowed_prefixes,
        }
    }

    /// Search albums, playlists and tracks
    pub async fn search(&self, params: &SearchParams) -> Result<Relayed, CatalogError> {
        let url = format!("{}/search", self.base_url);
        let query = [
            ("q", params.query.clone()),
            ("type", SEARCH_TYPES.to_string()),
            ("limit", params.limit.to_string()),
            ("offset", params.offset.to_string()),
        ];

        tracing::debug!(query = %params.query, limit = params.limit, offset = params.offset, "Catalog search");
        self.get_authorized(&url, &query).await
    }

    /// Newly released albums
    pub async fn new_releases(&self, limit: u32, offset: u32) -> Result<Relayed, CatalogError> {
        let url = format!("{}/browse/new-releases", self.base_url);
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        self.get_authorized(&url, &query).await
    }

    /// GET an arbitrary catalog path relative to the base URL
    pub async fn resource(&self, path: &str) -> Result<Relayed, CatalogError> {
        let path = check_resource_path(path, &self.allowed_prefixes)?;
        let url = self.resource_url(path)?;

        tracing::info!(path = %path, "Proxying request to catalog");
        self.get_authorized(url.as_str(), &[]).await
    }

    /// Join `path` onto the base URL and confirm the normalized result
    /// still sits under the base path on the same origin
    fn resource_url(&self, path: &str) -> Result<reqwest::Url, CatalogError> {
        let base = reqwest::Url::parse(&self.base_url).map_err(|e| UpstreamError::InvalidUrl {
            service: SERVICE,
            message: e.to_string(),
        })?;
        let url = reqwest::Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|_| CatalogError::PathRejected(path.to_string()))?;

        let base_path = format!("{}/", base.path().trim_end_matches('/'));
        if url.origin() != base.origin() || !url.path().starts_with(&base_path) {
            tracing::warn!(path = %path, resolved = %url, "Proxy path resolves outside catalog base");
            return Err(CatalogError::PathRejected(path.to_string()));
        }

        Ok(url)
    }

    async fn get_authorized(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Relayed, CatalogError> {
        let mut credential = self.tokens.ensure_valid().await?;
        let mut attempt = Attempt::Initial;

        loop {
            match self.send(url, query, &credential.token).await {
                Err(UpstreamError::Unauthorized { .. }) => match attempt {
                    Attempt::Initial => {
                        tracing::warn!(url = %url, "Catalog returned 401, refreshing token");
                        credential = self.tokens.force_refresh(&credential.token).await?;
                        attempt = Attempt::Retried;
                    }
                    Attempt::Retried => {
                        tracing::error!(url = %url, "Catalog returned 401 after refresh");
                        return Err(CatalogError::UnauthorizedRetryExhausted);
                    }
                },
                result => return result.map_err(CatalogError::from),
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Relayed, UpstreamError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        relay(SERVICE, response).await
    }
}

/// Normalize and vet a caller-supplied catalog path
///
/// Paths that could leave the catalog base (`..` segments in plain or
/// percent-encoded form, schemes, `//` authorities) are always rejected. A
/// non-empty `allowed_prefixes` further restricts the path to those leading
/// segments; empty means open passthrough.
pub fn check_resource_path<'a>(
    path: &'a str,
    allowed_prefixes: &[String],
) -> Result<&'a str, CatalogError> {
    let trimmed = path.trim();
    if trimmed.starts_with("//") || trimmed.contains("://") || trimmed.contains('\\') {
        return Err(CatalogError::PathRejected(path.to_string()));
    }

    let trimmed = trimmed.trim_start_matches('/');
    let route = trimmed.split(['?', '#']).next().unwrap_or_default();
    if route.split('/').any(is_dot_segment) {
        return Err(CatalogError::PathRejected(path.to_string()));
    }

    if !allowed_prefixes.is_empty()
        && !allowed_prefixes
            .iter()
            .any(|prefix| has_segment_prefix(route, prefix))
    {
        return Err(CatalogError::PathRejected(path.to_string()));
    }

    Ok(trimmed)
}

/// `.` or `..`, including the `%2e` spellings URL parsers normalize
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
    )
}

/// Prefix match on whole path segments: `tracks` admits `tracks/x`, not `tracksfoo`
fn has_segment_prefix(route: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match route.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_passthrough_accepts_catalog_paths() {
        assert_eq!(check_resource_path("tracks/abc123", &[]).unwrap(), "tracks/abc123");
        assert_eq!(check_resource_path("/albums/xyz", &[]).unwrap(), "albums/xyz");
        assert_eq!(
            check_resource_path("albums/xyz/tracks?offset=20&limit=20", &[]).unwrap(),
            "albums/xyz/tracks?offset=20&limit=20"
        );
    }

    #[test]
    fn test_escaping_paths_rejected() {
        for path in [
            "../v2/me",
            "tracks/../../admin",
            "https://evil.example/x",
            "//evil.example/x",
            "tracks\\abc",
            "./tracks",
            "tracks/%2e%2e/%2e%2e/admin",
            "tracks/%2E%2E/admin",
            "tracks/.%2e/admin",
            "tracks/%2e./admin",
            "%2e/tracks",
        ] {
            assert!(
                matches!(check_resource_path(path, &[]), Err(CatalogError::PathRejected(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_allow_list_restricts_prefixes() {
        let allowed = vec!["tracks/".to_string(), "/albums/".to_string()];
        assert!(check_resource_path("tracks/abc", &allowed).is_ok());
        assert!(check_resource_path("albums/abc", &allowed).is_ok());
        assert!(check_resource_path("me/playlists", &allowed).is_err());
    }

    #[test]
    fn test_allow_list_matches_whole_segments() {
        let allowed = vec!["tracks".to_string()];
        assert!(check_resource_path("tracks", &allowed).is_ok());
        assert!(check_resource_path("tracks/abc", &allowed).is_ok());
        assert!(check_resource_path("tracks?ids=a,b", &allowed).is_ok());
        assert!(check_resource_path("tracksfoo/abc", &allowed).is_err());
    }

    #[test]
    fn test_resource_url_stays_under_base() {
        let tokens = Arc::new(TokenManager::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/api/token".to_string(),
            "id".to_string(),
            "secret".to_string(),
        ));
        let client = CatalogClient::new(
            reqwest::Client::new(),
            "https://api.example.com/v1/",
            tokens,
            Vec::new(),
        );

        let url = client.resource_url("albums/xyz/tracks?offset=20").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/albums/xyz/tracks?offset=20");

        assert!(matches!(
            client.resource_url("tracks/%2e%2e/%2e%2e/admin"),
            Err(CatalogError::PathRejected(_))
        ));
    }
}
