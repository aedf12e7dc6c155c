//! Lyrics, news and lyric-explanation forwarder tests

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use wiremock::matchers::{bearer_token, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Lyrics
// =============================================================================

#[tokio::test]
async fn test_lyrics_requires_artist_and_title() {
    let app = spawn_app().await;

    for uri in [
        "/api/lyrics",
        "/api/lyrics?artist=Queen",
        "/api/lyrics?title=Bohemian%20Rhapsody",
        "/api/lyrics?artist=&title=x",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            json_body(&body)["error"]["message"],
            "Artist and title are required"
        );
    }

    assert_eq!(app.total_hits().await, 0);
}

#[tokio::test]
async fn test_lyrics_forwards_encoded_segments_verbatim() {
    let app = spawn_app().await;
    let raw = "{\"lyrics\":\"Is this the real life?\\r\\nIs this just fantasy?\"}";
    Mock::given(method("GET"))
        .and(path("/lyrics/v1/Queen/Bohemian%20Rhapsody"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = app
        .get("/api/lyrics?artist=Queen&title=Bohemian%20Rhapsody")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], raw.as_bytes());
}

#[tokio::test]
async fn test_lyrics_upstream_failure_is_server_error() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/lyrics/v1/Nobody/Nothing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "No lyrics found"})))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = app.get("/api/lyrics?artist=Nobody&title=Nothing").await;

    assert!(status.is_server_error());
    assert_eq!(json_body(&body)["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_lyrics_does_not_touch_catalog_token() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/lyrics/v1/Queen/Innuendo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"lyrics": ""})))
        .mount(&app.server)
        .await;

    app.get("/api/lyrics?artist=Queen&title=Innuendo").await;

    assert_eq!(app.hits(TOKEN_PATH).await, 0);
}

// =============================================================================
// News
// =============================================================================

#[tokio::test]
async fn test_news_defaults_page_and_page_size() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path(NEWS_PATH))
        .and(query_param("q", "music"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "20"))
        .and(header("x-api-key", NEWS_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": []})))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, _) = app.get("/api/music-news").await;
    assert_eq!(status, StatusCode::OK);

    // The key travels only in the header, never in the URL
    let requests = app.server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(name, _)| name != "apiKey"));
    assert!(!requests[0].url.as_str().contains(NEWS_KEY));
}

#[tokio::test]
async fn test_news_forwards_paging_and_body_verbatim() {
    let app = spawn_app().await;
    let raw = r#"{"status":"ok","totalResults":42,"articles":[{"title":"Charts"}]}"#;
    Mock::given(method("GET"))
        .and(path(NEWS_PATH))
        .and(query_param("page", "3"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = app.get("/api/music-news?page=3&pageSize=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], raw.as_bytes());
}

#[tokio::test]
async fn test_news_without_key_is_config_error() {
    let mut secrets = default_secrets();
    secrets.news_api_key = None;
    let app = spawn_app_with(secrets, |_| {}).await;

    let (status, body) = app.get("/api/music-news").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"]["code"], "CONFIG_ERROR");
    assert_eq!(app.total_hits().await, 0);
}

// =============================================================================
// Explain lyric
// =============================================================================

#[tokio::test]
async fn test_explain_returns_first_choice() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path(LLM_PATH))
        .and(bearer_token(LLM_KEY))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "It is about escapism."}}
            ]
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = app
        .post_json(
            "/api/explain-lyric",
            &json!({
                "full_lyrics": "Is this the real life?\nIs this just fantasy?",
                "selected_line": "Is this just fantasy?"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"explanation": "It is about escapism."}));

    let requests = app.server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = sent["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Is this the real life?"));
    assert!(prompt.contains("\"Is this just fantasy?\""));
}

#[tokio::test]
async fn test_explain_requires_both_fields() {
    let app = spawn_app().await;

    for body in [
        json!({}),
        json!({"full_lyrics": "la la"}),
        json!({"selected_line": "la"}),
        json!({"full_lyrics": "", "selected_line": "la"}),
    ] {
        let (status, _) = app.post_json("/api/explain-lyric", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    assert_eq!(app.total_hits().await, 0);
}

#[tokio::test]
async fn test_explain_rejects_non_json_body() {
    let app = spawn_app().await;

    let (status, body) = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/explain-lyric")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_explain_upstream_failure_is_server_error() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path(LLM_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "boom"}})))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = app
        .post_json(
            "/api/explain-lyric",
            &json!({"full_lyrics": "a\nb", "selected_line": "b"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(&body)["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_explain_without_key_is_config_error() {
    let mut secrets = default_secrets();
    secrets.llm_api_key = None;
    let app = spawn_app_with(secrets, |_| {}).await;

    let (status, _) = app
        .post_json(
            "/api/explain-lyric",
            &json!({"full_lyrics": "a", "selected_line": "a"}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.total_hits().await, 0);
}
