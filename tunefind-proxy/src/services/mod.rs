//! Upstream clients and the catalog token cache

pub mod lyrics_client;
pub mod news_client;
pub mod openai_client;
pub mod spotify_client;
pub mod token_manager;
pub mod upstream;

pub use lyrics_client::LyricsClient;
pub use news_client::NewsClient;
pub use openai_client::LlmClient;
pub use spotify_client::{CatalogClient, CatalogError, SearchParams};
pub use token_manager::{AuthError, Credential, TokenManager, TokenState};
pub use upstream::{Relayed, UpstreamError};
