//! Shared test harness: router wired to a wiremock upstream

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tunefind_common::config::{Secrets, ServiceConfig};
use tunefind_proxy::{build_router, AppState};
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const NEWS_KEY: &str = "news-key";
pub const LLM_KEY: &str = "llm-key";

pub const TOKEN_PATH: &str = "/api/token";
pub const CATALOG_PREFIX: &str = "/v1";
pub const LYRICS_PREFIX: &str = "/lyrics/v1";
pub const NEWS_PATH: &str = "/v2/everything";
pub const LLM_PATH: &str = "/openai/v1/chat/completions";

pub struct TestApp {
    pub server: MockServer,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    /// Send a request through the router and collect the response body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Bytes) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Number of upstream requests received on `path`
    pub async fn hits(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    pub async fn total_hits(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

pub fn default_secrets() -> Secrets {
    Secrets {
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        llm_api_key: Some(LLM_KEY.to_string()),
        news_api_key: Some(NEWS_KEY.to_string()),
    }
}

/// App with every upstream pointed at a fresh mock server
pub async fn spawn_app() -> TestApp {
    spawn_app_with(default_secrets(), |_| {}).await
}

pub async fn spawn_app_with(
    secrets: Secrets,
    customize: impl FnOnce(&mut ServiceConfig),
) -> TestApp {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut config = ServiceConfig::default();
    config.upstream.catalog_base_url = format!("{}{}", base, CATALOG_PREFIX);
    config.upstream.token_url = format!("{}{}", base, TOKEN_PATH);
    config.upstream.lyrics_base_url = format!("{}{}", base, LYRICS_PREFIX);
    config.upstream.news_url = format!("{}{}", base, NEWS_PATH);
    config.upstream.llm_url = format!("{}{}", base, LLM_PATH);
    customize(&mut config);

    let state = AppState::new(&config, secrets).unwrap();
    let router = build_router(state.clone());

    TestApp {
        server,
        state,
        router,
    }
}

/// Token endpoint issuing `token` valid for `expires_in` seconds
pub fn token_mock(token: &str, expires_in: i64) -> Mock {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": expires_in,
        })))
}

pub fn json_body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).expect("Should parse JSON")
}
