//! Mock streaming backend for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::stream_client::{
    AddTorrentRequest, AddTorrentResponse, StreamBackend, StreamClientError,
};

/// Base URL used for stream URLs built by the mock.
pub const MOCK_BACKEND_URL: &str = "http://mock-backend/api";

/// A recorded add-torrent call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAddTorrent {
    /// The request that was made.
    pub request: AddTorrentRequest,
    /// When the request was made.
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(AddTorrentResponse),
    Fail(StreamClientError),
}

/// Mock implementation of the StreamBackend trait.
///
/// Provides controllable behavior for testing:
/// - Per-magnet responses or failures
/// - Track add-torrent calls for assertions
/// - Simulate latency and observe request concurrency
///
/// Magnets without a configured outcome fail with an API error.
///
/// # Example
///
/// ```rust,ignore
/// let backend = MockStreamBackend::new();
/// backend.set_response(
///     "magnet:?xt=urn:btih:abc",
///     fixtures::p2p_response("abc", &[("Movie.mp4", 1000)]),
/// ).await;
///
/// let response = backend.add_torrent(&AddTorrentRequest::magnet("magnet:?xt=urn:btih:abc")).await?;
/// assert_eq!(backend.add_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockStreamBackend {
    /// Outcomes by magnet URI.
    outcomes: Arc<RwLock<HashMap<String, MockOutcome>>>,
    /// Recorded add_torrent calls.
    added: Arc<RwLock<Vec<RecordedAddTorrent>>>,
    /// Simulated latency per call.
    delay: Arc<RwLock<Duration>>,
    in_progress: AtomicUsize,
    max_in_progress: AtomicUsize,
}

impl Default for MockStreamBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStreamBackend {
    /// Create a new mock backend with no configured outcomes.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(RwLock::new(HashMap::new())),
            added: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_progress: AtomicUsize::new(0),
            max_in_progress: AtomicUsize::new(0),
        }
    }

    /// Respond to a magnet with the given response.
    pub async fn set_response(&self, magnet: &str, response: AddTorrentResponse) {
        self.outcomes
            .write()
            .await
            .insert(magnet.to_string(), MockOutcome::Respond(response));
    }

    /// Fail every add of a magnet with the given error.
    pub async fn set_failure(&self, magnet: &str, error: StreamClientError) {
        self.outcomes
            .write()
            .await
            .insert(magnet.to_string(), MockOutcome::Fail(error));
    }

    /// Simulate backend latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded add_torrent calls.
    pub async fn added_torrents(&self) -> Vec<RecordedAddTorrent> {
        self.added.read().await.clone()
    }

    /// Requests received, in order.
    pub async fn recorded_requests(&self) -> Vec<AddTorrentRequest> {
        self.added
            .read()
            .await
            .iter()
            .map(|r| r.request.clone())
            .collect()
    }

    /// Number of add_torrent calls received.
    pub async fn add_count(&self) -> usize {
        self.added.read().await.len()
    }

    /// Highest number of add_torrent calls that were in progress at once.
    pub async fn max_concurrent_requests(&self) -> usize {
        self.max_in_progress.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamBackend for MockStreamBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_torrent(
        &self,
        request: &AddTorrentRequest,
    ) -> Result<AddTorrentResponse, StreamClientError> {
        let now = self.in_progress.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_progress.fetch_max(now, Ordering::SeqCst);

        self.added.write().await.push(RecordedAddTorrent {
            request: request.clone(),
            timestamp: Utc::now(),
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.outcomes.read().await.get(&request.magnet_uri).cloned();
        self.in_progress.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Some(MockOutcome::Respond(response)) => Ok(response),
            Some(MockOutcome::Fail(error)) => Err(error),
            None => Err(StreamClientError::ApiError(format!(
                "HTTP 404: no mock response for {}",
                request.magnet_uri
            ))),
        }
    }

    fn stream_url(&self, hash: &str, file_index: usize) -> String {
        format!(
            "{}/torrents/stream/{}/files/{}/stream",
            MOCK_BACKEND_URL, hash, file_index
        )
    }
}
