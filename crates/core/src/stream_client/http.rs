//! HTTP client for the backend's add-torrent endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::metrics;

use super::normalize::add_response_from_value;
use super::{AddTorrentRequest, AddTorrentResponse, StreamBackend, StreamClientError};

/// Talks to `POST /torrents/stream` and builds per-file stream URLs.
pub struct HttpStreamBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpStreamBackend {
    /// Create a backend client sharing an existing HTTP client.
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.add_timeout(),
        }
    }

    async fn post(&self, request: &AddTorrentRequest) -> Result<AddTorrentResponse, StreamClientError> {
        let url = format!("{}/torrents/stream", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StreamClientError::Timeout
                } else if e.is_connect() {
                    StreamClientError::ConnectionFailed(e.to_string())
                } else {
                    StreamClientError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StreamClientError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                StreamClientError::Timeout
            } else {
                StreamClientError::InvalidResponse(e.to_string())
            }
        })?;

        add_response_from_value(&body)
    }
}

#[async_trait]
impl StreamBackend for HttpStreamBackend {
    fn name(&self) -> &str {
        "backend"
    }

    async fn add_torrent(
        &self,
        request: &AddTorrentRequest,
    ) -> Result<AddTorrentResponse, StreamClientError> {
        let start = Instant::now();
        debug!(
            magnet = %request.magnet_uri,
            episode = ?request.episode_info.map(|e| e.episode),
            "Adding torrent"
        );

        let result = self.post(request).await;

        metrics::BACKEND_DURATION
            .with_label_values(&["add"])
            .observe(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::BACKEND_REQUESTS
            .with_label_values(&["add", status])
            .inc();

        result
    }

    fn stream_url(&self, hash: &str, file_index: usize) -> String {
        format!(
            "{}/torrents/stream/{}/files/{}/stream",
            self.base_url, hash, file_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn backend_for(url: &str, timeout_secs: u32) -> HttpStreamBackend {
        let config = BackendConfig {
            url: url.to_string(),
            add_timeout_secs: timeout_secs,
            ..Default::default()
        };
        HttpStreamBackend::new(Client::new(), &config)
    }

    #[test]
    fn test_stream_url() {
        let backend = backend_for("http://localhost:8000/api/", 45);
        assert_eq!(
            backend.stream_url("abc123", 2),
            "http://localhost:8000/api/torrents/stream/abc123/files/2/stream"
        );
    }

    #[tokio::test]
    async fn test_add_torrent_sends_magnet_and_episode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/torrents/stream")
            .match_body(Matcher::Json(serde_json::json!({
                "magnetURI": "magnet:?xt=urn:btih:abc",
                "episodeInfo": {"episode": 5}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"hash":"abc","name":"Show","files":[{"name":"Show - 05.mkv","size":500,"index":0}],"selectedFileIndex":0}}"#,
            )
            .create_async()
            .await;

        let backend = backend_for(&server.url(), 45);
        let response = backend
            .add_torrent(&AddTorrentRequest::magnet("magnet:?xt=urn:btih:abc").with_episode(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.hash, "abc");
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.selected_file_index, Some(0));
    }

    #[tokio::test]
    async fn test_add_torrent_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/torrents/stream")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let backend = backend_for(&server.url(), 45);
        let err = backend
            .add_torrent(&AddTorrentRequest::magnet("magnet:?xt=urn:btih:abc"))
            .await
            .unwrap_err();
        match err {
            StreamClientError::ApiError(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("slow down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_torrent_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/torrents/stream")
            .with_status(200)
            .with_body("definitely not json")
            .create_async()
            .await;

        let backend = backend_for(&server.url(), 45);
        let err = backend
            .add_torrent(&AddTorrentRequest::magnet("magnet:?xt=urn:btih:abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamClientError::InvalidResponse(_)));
    }
}
