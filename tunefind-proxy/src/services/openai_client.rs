//! LLM chat-completion client used to explain a lyric line

use serde::{Deserialize, Serialize};
use tunefind_common::config::ENV_LLM_API_KEY;

use super::upstream::{error_body, UpstreamError};

const SERVICE: &str = "llm";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Chat-completion client
pub struct LlmClient {
    http_client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(http_client: reqwest::Client, url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            http_client,
            url: url.to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Ask the model what `selected_line` means within `full_lyrics`
    pub async fn explain(&self, full_lyrics: &str, selected_line: &str) -> Result<String, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::NotConfigured {
            service: SERVICE,
            missing: ENV_LLM_API_KEY,
        })?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(explain_prompt(full_lyrics, selected_line)),
            }],
        };

        tracing::debug!(model = %self.model, line_len = selected_line.len(), "Requesting lyric explanation");

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| UpstreamError::Parse {
            service: SERVICE,
            message: e.to_string(),
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Parse {
                service: SERVICE,
                message: "completion contained no message content".to_string(),
            })
    }
}

/// Single user message sent to the model
pub fn explain_prompt(full_lyrics: &str, selected_line: &str) -> String {
    format!(
        "Full song lyrics:\n{}\n\nExplain the meaning of this line:\n\"{}\"\n",
        full_lyrics, selected_line
    )
}
