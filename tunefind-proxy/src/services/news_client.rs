//! Music news client (NewsAPI `everything` search)

use tunefind_common::config::ENV_NEWS_API_KEY;

use super::upstream::{relay, Relayed, UpstreamError};

const SERVICE: &str = "news";

/// Search term sent with every news query
pub const NEWS_TERM: &str = "music";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// News API client
pub struct NewsClient {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(http_client: reqwest::Client, url: &str, api_key: Option<String>) -> Self {
        Self {
            http_client,
            url: url.to_string(),
            api_key,
        }
    }

    /// One page of music news
    pub async fn music_news(&self, page: u32, page_size: u32) -> Result<Relayed, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::NotConfigured {
            service: SERVICE,
            missing: ENV_NEWS_API_KEY,
        })?;

        tracing::debug!(page = page, page_size = page_size, "Querying news API");

        let response = self
            .http_client
            .get(&self.url)
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", NEWS_TERM.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        relay(SERVICE, response).await
    }
}
