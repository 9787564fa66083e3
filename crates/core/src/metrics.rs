//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search (primary and fallback queries, result counts)
//! - Filtering (rejections by reason)
//! - Resolution (attempts, end-to-end duration, cache lookups)
//! - The torrent backend (request count and latency per operation)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches issued, by phase and result.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamseek_searches_total", "Total torrent searches issued"),
        &["phase", "result"], // phase: "primary", "fallback"; result: "hit", "empty", "error"
    )
    .unwrap()
});

/// Search results returned per query.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamseek_search_results",
            "Number of search results returned per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Filter Metrics
// =============================================================================

/// Candidates rejected by the compatibility filter.
pub static CANDIDATES_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamseek_candidates_rejected_total",
            "Total candidates rejected by the compatibility filter",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Per-candidate resolution attempts by result.
pub static RESOLUTION_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamseek_resolution_attempts_total",
            "Total candidate resolution attempts",
        ),
        &["result"], // "debrid", "p2p", "failed"
    )
    .unwrap()
});

/// End-to-end pipeline duration.
pub static RESOLUTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamseek_resolution_duration_seconds",
            "Duration of the search, filter and resolve pipeline",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["outcome"], // "resolved", "unresolved"
    )
    .unwrap()
});

/// Stream cache lookups.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamseek_cache_lookups_total", "Total stream cache lookups"),
        &["result"], // "hit", "joined", "miss"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// Torrent backend request duration.
pub static BACKEND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamseek_backend_duration_seconds",
            "Duration of torrent backend calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 45.0]),
        &["operation"],
    )
    .unwrap()
});

/// Torrent backend requests total.
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamseek_backend_requests_total",
            "Total torrent backend requests",
        ),
        &["operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Filter
        Box::new(CANDIDATES_REJECTED.clone()),
        // Resolution
        Box::new(RESOLUTION_ATTEMPTS.clone()),
        Box::new(RESOLUTION_DURATION.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        // Backend
        Box::new(BACKEND_DURATION.clone()),
        Box::new(BACKEND_REQUESTS.clone()),
    ]
}
