//! Resolved stream cache.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::resolver::ResolvedStream;

/// Identifies one playable item: `"{id}_{season|movie}_{episode|}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(media_id: &str, season: Option<u32>, episode: Option<u32>) -> Self {
        let season = season
            .map(|s| s.to_string())
            .unwrap_or_else(|| "movie".to_string());
        let episode = episode.map(|e| e.to_string()).unwrap_or_default();
        Self(format!("{}_{}_{}", media_id, season, episode))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CachedStream {
    stream: ResolvedStream,
    stored_at: Instant,
}

/// At most one entry per key; entries older than the TTL are never returned.
#[derive(Debug)]
pub struct StreamCache {
    entries: HashMap<CacheKey, CachedStream>,
    ttl: Duration,
}

impl StreamCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`, dropping it if it has expired.
    pub fn get(&mut self, key: &CacheKey) -> Option<ResolvedStream> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.stream.clone());
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: CacheKey, stream: ResolvedStream) {
        self.entries.insert(
            key,
            CachedStream {
                stream,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(url: &str) -> ResolvedStream {
        ResolvedStream::Debrid {
            stream_url: url.to_string(),
            service_name: None,
            subtitles: vec![],
        }
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(CacheKey::new("603", None, None).as_str(), "603_movie_");
        assert_eq!(CacheKey::new("1399", Some(1), Some(2)).as_str(), "1399_1_2");
        assert_eq!(CacheKey::new("1399", Some(3), None).to_string(), "1399_3_");
        assert_eq!(CacheKey::new("21", None, Some(1000)).as_str(), "21_movie_1000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let mut cache = StreamCache::new(Duration::from_secs(300));
        let key = CacheKey::new("603", None, None);
        cache.insert(key.clone(), stream("http://a"));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(&key), Some(stream("http://a")));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let mut cache = StreamCache::new(Duration::from_secs(300));
        let key = CacheKey::new("1", Some(1), Some(1));
        cache.insert(key.clone(), stream("http://a"));
        cache.insert(key.clone(), stream("http://b"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().stream_url(), "http://b");
    }
}
