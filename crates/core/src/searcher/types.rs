//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A search string plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query.
    pub text: String,
    /// Whether this query came from the fallback list.
    pub is_fallback: bool,
    /// Position in the fallback list (0 for the primary query).
    pub fallback_rank: usize,
}

impl SearchQuery {
    pub fn primary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_fallback: false,
            fallback_rank: 0,
        }
    }

    pub fn fallback(text: impl Into<String>, rank: usize) -> Self {
        Self {
            text: text.into(),
            is_fallback: true,
            fallback_rank: rank,
        }
    }
}

/// One search result from the torrent backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentCandidate {
    /// Free-text release name.
    pub name: String,
    pub magnet_link: String,
    pub size_bytes: u64,
    pub seeders: u32,
    /// Backend-provided score; overwritten by the scorer.
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

impl TorrentCandidate {
    /// Info hash (lowercase hex) from the magnet link, if present.
    pub fn info_hash(&self) -> Option<String> {
        let start = self.magnet_link.find("urn:btih:")? + "urn:btih:".len();
        let hash: String = self.magnet_link[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if hash.is_empty() {
            None
        } else {
            Some(hash.to_lowercase())
        }
    }
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Search backend returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for torrent search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run one search for a query string.
    async fn search(&self, query: &str) -> Result<Vec<TorrentCandidate>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(magnet: &str) -> TorrentCandidate {
        TorrentCandidate {
            name: "Test".to_string(),
            magnet_link: magnet.to_string(),
            size_bytes: 0,
            seeders: 0,
            score: 0.0,
            quality: None,
            source: None,
            audio_language: None,
            audio_codec: None,
        }
    }

    #[test]
    fn test_info_hash_from_magnet() {
        let c = candidate("magnet:?xt=urn:btih:ABCDEF0123456789&dn=Test");
        assert_eq!(c.info_hash().as_deref(), Some("abcdef0123456789"));
        assert!(candidate("magnet:?dn=nohash").info_hash().is_none());
        assert!(candidate("").info_hash().is_none());
    }

    #[test]
    fn test_search_query_constructors() {
        let q = SearchQuery::primary("Dune 2021");
        assert!(!q.is_fallback);
        assert_eq!(q.fallback_rank, 0);

        let q = SearchQuery::fallback("Dune", 1);
        assert!(q.is_fallback);
        assert_eq!(q.fallback_rank, 1);
    }

    #[test]
    fn test_candidate_serialization_skips_missing_labels() {
        let json = serde_json::to_string(&candidate("magnet:?xt=urn:btih:aa")).unwrap();
        assert!(!json.contains("quality"));
        assert!(json.contains("\"seeders\":0"));
    }
}
