//! Lyrics lookup client (lyrics.ovh)

use super::upstream::{relay, Relayed, UpstreamError};

const SERVICE: &str = "lyrics";

/// Lyrics API client
pub struct LyricsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LyricsClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }

    /// Fetch lyrics for `artist` / `title`
    pub async fn lookup(&self, artist: &str, title: &str) -> Result<Relayed, UpstreamError> {
        let url = self.lookup_url(artist, title)?;

        tracing::debug!(artist = %artist, title = %title, "Querying lyrics API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        relay(SERVICE, response).await
    }

    /// `{base}/{artist}/{title}` with each segment percent-encoded
    pub fn lookup_url(&self, artist: &str, title: &str) -> Result<reqwest::Url, UpstreamError> {
        let invalid = |message: String| UpstreamError::InvalidUrl {
            service: SERVICE,
            message,
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(artist)
            .push(title);
        Ok(url)
    }
}
