//! HTTP search client for the torrent backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::metrics;

use super::normalize::candidates_from_response;
use super::{SearchError, Searcher, TorrentCandidate};

/// Searches the backend's `GET /torrents/search/{query}` endpoint.
pub struct HttpSearcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSearcher {
    /// Create a searcher sharing an existing HTTP client.
    pub fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.search_timeout(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/torrents/search/{}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    async fn fetch(&self, query: &str) -> Result<Vec<TorrentCandidate>, SearchError> {
        let response = self
            .client
            .get(self.search_url(query))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::ConnectionFailed(e.to_string())
                } else {
                    SearchError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(candidates_from_response(&body))
    }
}

#[async_trait]
impl Searcher for HttpSearcher {
    fn name(&self) -> &str {
        "backend"
    }

    async fn search(&self, query: &str) -> Result<Vec<TorrentCandidate>, SearchError> {
        let start = Instant::now();
        debug!(query = query, "Searching torrent backend");

        let result = self.fetch(query).await;

        metrics::BACKEND_DURATION
            .with_label_values(&["search"])
            .observe(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::BACKEND_REQUESTS
            .with_label_values(&["search", status])
            .inc();

        if let Ok(candidates) = &result {
            metrics::SEARCH_RESULTS
                .with_label_values(&[])
                .observe(candidates.len() as f64);
            debug!(query = query, results = candidates.len(), "Search complete");
        }

        result
    }
}
