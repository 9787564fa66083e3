//! Mock searcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::searcher::{SearchError, Searcher, TorrentCandidate};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query that was searched.
    pub query: String,
    /// When the search was made.
    pub timestamp: Instant,
}

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<TorrentCandidate>> + Send + Sync>;

/// Produces the error returned by every search while set.
type ErrorFactory = Box<dyn Fn() -> SearchError + Send + Sync>;

/// Mock implementation of the Searcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search queries for assertions
/// - Simulate failures and delays
///
/// # Example
///
/// ```rust,ignore
/// use streamseek_core::testing::{MockSearcher, fixtures};
///
/// let searcher = MockSearcher::new();
/// searcher.set_results(vec![
///     fixtures::candidate("Game.of.Thrones.S01E01.1080p.mp4", "abc123", 50),
/// ]).await;
///
/// let results = searcher.search("Game of Thrones S01E01").await?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(searcher.queries().await, vec!["Game of Thrones S01E01"]);
/// ```
pub struct MockSearcher {
    /// Configured results to return.
    results: Arc<RwLock<Vec<TorrentCandidate>>>,
    /// Recorded search queries, failed ones included.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
    /// If set, every search fails.
    persistent_error: Arc<RwLock<Option<ErrorFactory>>>,
    /// Query handler for dynamic result generation based on query string.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
    /// Simulated latency per search.
    delay: Arc<RwLock<Duration>>,
}

impl std::fmt::Debug for MockSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearcher")
            .field("results", &"<results>")
            .field("searches", &"<searches>")
            .field("next_error", &"<next_error>")
            .field("persistent_error", &"<persistent_error>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a new mock searcher with empty results.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            persistent_error: Arc::new(RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Set the results to return for subsequent searches.
    ///
    /// Without a query handler, a result is returned when every word of the
    /// query appears in its name (case-insensitive).
    pub async fn set_results(&self, results: Vec<TorrentCandidate>) {
        *self.results.write().await = results;
    }

    /// Add a single result.
    pub async fn add_result(&self, result: TorrentCandidate) {
        self.results.write().await.push(result);
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Query strings searched, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.searches
            .read()
            .await
            .iter()
            .map(|s| s.query.clone())
            .collect()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every search fail until cleared.
    pub async fn set_persistent_error<F>(&self, factory: F)
    where
        F: Fn() -> SearchError + Send + Sync + 'static,
    {
        *self.persistent_error.write().await = Some(Box::new(factory));
    }

    /// Clear any pending or persistent error.
    pub async fn clear_errors(&self) {
        *self.next_error.write().await = None;
        *self.persistent_error.write().await = None;
    }

    /// Set a query handler that dynamically generates results based on the query string.
    ///
    /// This is useful for testing fallback scenarios where different queries should
    /// return different results. The handler receives the query string and should return
    /// `Some(results)` to override the default results, or `None` to use the default behavior.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<TorrentCandidate>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Simulate search latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    async fn take_error(&self) -> Option<SearchError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        self.persistent_error.read().await.as_ref().map(|f| f())
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<TorrentCandidate>, SearchError> {
        self.searches.write().await.push(RecordedSearch {
            query: query.to_string(),
            timestamp: Instant::now(),
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(handler) = self.query_handler.read().await.as_ref() {
            if let Some(results) = handler(query) {
                return Ok(results);
            }
        }

        let query_lower = query.to_lowercase();
        let results = self.results.read().await;
        Ok(results
            .iter()
            .filter(|c| {
                let name = c.name.to_lowercase();
                query_lower
                    .split_whitespace()
                    .all(|word| name.contains(word))
            })
            .cloned()
            .collect())
    }
}
