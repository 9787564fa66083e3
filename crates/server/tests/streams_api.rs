//! In-process tests for the streams API.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

fn matrix() -> serde_json::Value {
    json!({
        "id": 603,
        "type": "movie",
        "title": "The Matrix",
        "release_date": "1999-03-30"
    })
}

async fn with_matrix_sources(fixture: &TestFixture) {
    fixture
        .searcher
        .set_results(vec![
            fixtures::candidate("The.Matrix.1999.1080p.BluRay.AAC.mp4", "neo", 80),
            fixtures::candidate("The.Matrix.1999.720p.x264.mkv", "trinity", 40),
        ])
        .await;
    fixture
        .backend
        .set_response(
            "magnet:?xt=urn:btih:neo",
            fixtures::p2p_response("neo", &[("The.Matrix.1999.mp4", 2_000)]),
        )
        .await;
    fixture
        .backend
        .set_response(
            "magnet:?xt=urn:btih:trinity",
            fixtures::p2p_response("trinity", &[("The.Matrix.1999.mkv", 1_500)]),
        )
        .await;
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_exposes_engine_settings() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["engine"]["max_attempts"], 3);
    assert_eq!(response.body["backend"]["url"], "http://localhost:8000/api");
}

#[tokio::test]
async fn test_prepare_returns_stream() {
    let fixture = TestFixture::new();
    with_matrix_sources(&fixture).await;

    let response = fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["key"], "603_movie_");
    assert_eq!(
        response.body["stream_url"],
        "http://mock-backend/api/torrents/stream/neo/files/0/stream"
    );
    assert_eq!(response.body["stream"]["kind"], "p2p");
    assert_eq!(response.body["stream"]["torrent_hash"], "neo");
    assert_eq!(fixture.searcher.queries().await, vec!["The Matrix 1999"]);
}

#[tokio::test]
async fn test_prepare_without_sources_returns_null_stream() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["stream"].is_null());
    assert!(response.body["stream_url"].is_null());
}

#[tokio::test]
async fn test_prepare_rejects_media_without_id() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/streams/prepare",
            json!({ "media": { "type": "movie", "title": "Nameless" } }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("identifier"));
}

#[tokio::test]
async fn test_prepare_rejects_unknown_media_type() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/streams/prepare",
            json!({ "media": matrix(), "media_type": "podcast" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_alternatives_and_switch() {
    let fixture = TestFixture::new();
    with_matrix_sources(&fixture).await;

    let response = fixture
        .post("/api/v1/streams/alternatives", json!({ "media": matrix() }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let alternatives = response.body["alternatives"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[1]["name"], "The.Matrix.1999.720p.x264.mkv");

    let response = fixture
        .post(
            "/api/v1/streams/switch",
            json!({ "media": matrix(), "index": 1 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["stream"]["torrent_hash"], "trinity");
}

#[tokio::test]
async fn test_switch_to_missing_index_is_not_found() {
    let fixture = TestFixture::new();
    with_matrix_sources(&fixture).await;
    fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;

    let response = fixture
        .post(
            "/api/v1/streams/switch",
            json!({ "media": matrix(), "index": 7 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"].as_str().unwrap().contains("index 7"));
}

#[tokio::test]
async fn test_switch_to_failing_source_returns_null_stream() {
    let fixture = TestFixture::new();
    fixture
        .searcher
        .set_results(vec![
            fixtures::candidate("The.Matrix.1999.1080p.AAC.mp4", "neo", 80),
            fixtures::candidate("The.Matrix.1999.720p.AAC.mp4", "dead", 20),
        ])
        .await;
    fixture
        .backend
        .set_response(
            "magnet:?xt=urn:btih:neo",
            fixtures::p2p_response("neo", &[("The.Matrix.1999.mp4", 2_000)]),
        )
        .await;

    fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;
    let response = fixture
        .post(
            "/api/v1/streams/switch",
            json!({ "media": matrix(), "index": 1 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["stream"].is_null());
}

#[tokio::test]
async fn test_clear_forces_new_search() {
    let fixture = TestFixture::new();
    with_matrix_sources(&fixture).await;

    fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;
    fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;
    assert_eq!(fixture.searcher.search_count().await, 1);

    let response = fixture.delete("/api/v1/streams").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["cleared"], true);

    fixture
        .post("/api/v1/streams/prepare", json!({ "media": matrix() }))
        .await;
    assert_eq!(fixture.searcher.search_count().await, 2);
}

#[tokio::test]
async fn test_show_episode_prepare() {
    let fixture = TestFixture::new();
    fixture
        .searcher
        .set_results(vec![fixtures::candidate(
            "Severance.S02E04.1080p.WEB.AAC.mp4",
            "sev",
            60,
        )])
        .await;
    fixture
        .backend
        .set_response(
            "magnet:?xt=urn:btih:sev",
            fixtures::p2p_response("sev", &[("Severance.S02E04.mp4", 900)]),
        )
        .await;

    let response = fixture
        .post(
            "/api/v1/streams/prepare",
            json!({
                "media": { "id": "95396", "media_type": "tv", "name": "Severance" },
                "season": 2,
                "episode": 4
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["key"], "95396_2_4");
    assert!(response.body["stream_url"]
        .as_str()
        .unwrap()
        .ends_with("/sev/files/0/stream"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("streamseek_http_requests_total"));
}
