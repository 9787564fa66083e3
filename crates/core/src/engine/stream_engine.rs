//! The stream engine facade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::matcher::{filter_and_score, FilterError, MatchTarget};
use crate::media::MediaDescriptor;
use crate::metrics;
use crate::resolver::{EpisodeTarget, ResolveError, ResolvedStream, Resolver};
use crate::searcher::{search_with_fallback, Searcher, TorrentCandidate};
use crate::stream_client::StreamBackend;

use super::{CacheKey, PlaybackSession, StreamCache};

type SharedResolution = Shared<BoxFuture<'static, Option<ResolvedStream>>>;

/// Filters and ranks search results before resolution.
pub(crate) type CandidateFilter = fn(
    Vec<TorrentCandidate>,
    &MatchTarget,
    &EngineConfig,
) -> Result<Vec<TorrentCandidate>, FilterError>;

/// Errors from switching to an alternative source.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("No alternative at index {index} ({available} available)")]
    NoAlternative { index: usize, available: usize },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

struct InFlight {
    id: u64,
    resolution: SharedResolution,
}

/// A pipeline registered as in flight but not yet spawned.
struct PendingPipeline {
    id: u64,
    epoch: u64,
    sender: oneshot::Sender<Option<ResolvedStream>>,
}

struct EngineState {
    cache: StreamCache,
    in_flight: HashMap<CacheKey, InFlight>,
    sessions: HashMap<CacheKey, PlaybackSession>,
    /// Bumped by `clear()`; pipelines started before a clear discard results.
    epoch: u64,
    next_id: u64,
}

struct EngineInner {
    searcher: Arc<dyn Searcher>,
    resolver: Resolver,
    filter: CandidateFilter,
    config: EngineConfig,
    state: Mutex<EngineState>,
}

impl EngineInner {
    fn state(&self) -> MutexGuard<'_, EngineState> {
        // State stays consistent across panics: every mutation is a single
        // map operation.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes the in-flight entry when the pipeline task ends, however it ends.
struct InFlightGuard {
    inner: Arc<EngineInner>,
    key: CacheKey,
    id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        if state.in_flight.get(&self.key).is_some_and(|f| f.id == self.id) {
            state.in_flight.remove(&self.key);
        }
    }
}

/// Finds and resolves playable streams, one pipeline per content key.
///
/// Cheap to clone; clones share cache, sessions and in-flight work.
#[derive(Clone)]
pub struct StreamEngine {
    inner: Arc<EngineInner>,
}

impl StreamEngine {
    pub fn new(
        searcher: Arc<dyn Searcher>,
        backend: Arc<dyn StreamBackend>,
        config: EngineConfig,
    ) -> Self {
        Self::with_filter(searcher, backend, config, filter_and_score)
    }

    pub(crate) fn with_filter(
        searcher: Arc<dyn Searcher>,
        backend: Arc<dyn StreamBackend>,
        config: EngineConfig,
        filter: CandidateFilter,
    ) -> Self {
        let state = EngineState {
            cache: StreamCache::new(config.cache_ttl()),
            in_flight: HashMap::new(),
            sessions: HashMap::new(),
            epoch: 0,
            next_id: 0,
        };

        Self {
            inner: Arc::new(EngineInner {
                searcher,
                resolver: Resolver::new(backend, config.clone()),
                filter,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Resolve a stream for an item, using the cache and joining any
    /// resolution already running for the same key.
    pub async fn resolve_stream(
        &self,
        media: &MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Option<ResolvedStream> {
        let key = CacheKey::new(&media.id, season, episode);

        let (resolution, pending) = {
            let mut state = self.inner.state();

            if let Some(stream) = state.cache.get(&key) {
                metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!(key = %key, "Stream cache hit");
                return Some(stream);
            }

            if let Some(in_flight) = state.in_flight.get(&key) {
                metrics::CACHE_LOOKUPS.with_label_values(&["joined"]).inc();
                debug!(key = %key, "Joining in-flight resolution");
                (in_flight.resolution.clone(), None)
            } else {
                metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                let id = state.next_id;
                state.next_id += 1;

                let (sender, receiver) = oneshot::channel();
                let resolution = async move {
                    receiver.await.unwrap_or_else(|_| {
                        warn!("Resolution task ended without a result");
                        None
                    })
                }
                .boxed()
                .shared();

                state.in_flight.insert(
                    key.clone(),
                    InFlight {
                        id,
                        resolution: resolution.clone(),
                    },
                );
                let pending = PendingPipeline {
                    id,
                    epoch: state.epoch,
                    sender,
                };
                (resolution, Some(pending))
            }
        };

        // Spawned with the state lock released: a task dropped inside
        // `spawn` takes its in-flight guard, and the guard locks the state.
        if let Some(pending) = pending {
            self.spawn_pipeline(key, pending, media.clone(), season, episode);
        }

        resolution.await
    }

    /// Resolve and return only the stream URL.
    pub async fn prepare(
        &self,
        media: &MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Option<String> {
        self.resolve_stream(media, season, episode)
            .await
            .map(|s| s.stream_url().to_string())
    }

    /// Alternative sources for an item, resolving it first if needed.
    pub async fn alternatives(
        &self,
        media: &MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Vec<TorrentCandidate> {
        let key = CacheKey::new(&media.id, season, episode);
        if let Some(session) = self.session(&key) {
            return session.alternatives;
        }

        self.resolve_stream(media, season, episode).await;
        self.session(&key)
            .map(|s| s.alternatives)
            .unwrap_or_default()
    }

    /// Re-resolve an item from one of its alternatives, skipping search.
    ///
    /// On success the cache and session point at the new stream.
    pub async fn switch_source(
        &self,
        media: &MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
        index: usize,
    ) -> Result<ResolvedStream, SwitchError> {
        let key = CacheKey::new(&media.id, season, episode);

        let candidate = {
            let state = self.inner.state();
            let alternatives = state
                .sessions
                .get(&key)
                .map(|s| s.alternatives.as_slice())
                .unwrap_or_default();
            alternatives
                .get(index)
                .cloned()
                .ok_or(SwitchError::NoAlternative {
                    index,
                    available: alternatives.len(),
                })?
        };

        info!(key = %key, index = index, name = %candidate.name, "Switching source");
        let target = EpisodeTarget {
            kind: media.kind,
            season,
            episode,
        };
        let stream = self
            .inner
            .resolver
            .resolve_candidate(&candidate, &target)
            .await?;

        let mut state = self.inner.state();
        state.cache.insert(key.clone(), stream.clone());
        if let Some(session) = state.sessions.get_mut(&key) {
            session.stream = Some(stream.clone());
            session.updated_at = Utc::now();
        }

        Ok(stream)
    }

    pub fn session(&self, key: &CacheKey) -> Option<PlaybackSession> {
        self.inner.state().sessions.get(key).cloned()
    }

    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.inner.state().in_flight.contains_key(key)
    }

    /// Drop cached streams and sessions. Resolutions still running finish
    /// for their current callers but are not cached.
    pub fn clear(&self) {
        let mut state = self.inner.state();
        state.cache.clear();
        state.sessions.clear();
        state.in_flight.clear();
        state.epoch += 1;
        info!("Stream engine state cleared");
    }

    fn spawn_pipeline(
        &self,
        key: CacheKey,
        pending: PendingPipeline,
        media: MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
    ) {
        let inner = self.inner.clone();
        let guard = InFlightGuard {
            inner: inner.clone(),
            key: key.clone(),
            id: pending.id,
        };

        tokio::spawn(async move {
            let stream = run_pipeline(&inner, key, pending.epoch, &media, season, episode).await;
            // Leave the in-flight map before waking waiters.
            drop(guard);
            let _ = pending.sender.send(stream);
        });
    }
}

async fn run_pipeline(
    inner: &EngineInner,
    key: CacheKey,
    epoch: u64,
    media: &MediaDescriptor,
    season: Option<u32>,
    episode: Option<u32>,
) -> Option<ResolvedStream> {
    let start = tokio::time::Instant::now();
    let config = &inner.config;

    let outcome = search_with_fallback(inner.searcher.as_ref(), media, season, episode).await;
    if outcome.candidates.is_empty() {
        if outcome.backend_unreachable() {
            warn!(
                key = %key,
                searches = outcome.searches,
                "Search backend unreachable, no candidates found"
            );
        } else {
            info!(
                key = %key,
                query = %outcome.query.text,
                transport_failures = outcome.transport_failures,
                "No candidates found"
            );
        }
        observe_duration(start, false);
        return None;
    }

    let target = MatchTarget::new(media, season, episode, outcome.used_fallback);
    let scored = match (inner.filter)(outcome.candidates.clone(), &target, config) {
        Ok(scored) => scored,
        Err(e) => {
            warn!(
                key = %key,
                error = %e,
                "Filtering failed, using first raw candidates unscored"
            );
            outcome
                .candidates
                .iter()
                .take(config.degraded_candidate_count)
                .cloned()
                .collect()
        }
    };

    let alternatives: Vec<TorrentCandidate> =
        scored.iter().take(config.max_alternatives).cloned().collect();

    let episode_target = EpisodeTarget {
        kind: media.kind,
        season,
        episode,
    };
    let stream = if scored.is_empty() {
        info!(key = %key, found = outcome.candidates.len(), "Every candidate was rejected");
        None
    } else {
        inner.resolver.resolve(&scored, &episode_target).await
    };

    {
        let mut state = inner.state();
        if state.epoch == epoch {
            if let Some(stream) = &stream {
                state.cache.insert(key.clone(), stream.clone());
            }
            state.sessions.insert(
                key,
                PlaybackSession {
                    stream: stream.clone(),
                    alternatives,
                    query: outcome.query,
                    used_fallback: outcome.used_fallback,
                    updated_at: Utc::now(),
                },
            );
        }
    }

    observe_duration(start, stream.is_some());
    stream
}

fn observe_duration(start: tokio::time::Instant, resolved: bool) {
    let outcome = if resolved { "resolved" } else { "unresolved" };
    metrics::RESOLUTION_DURATION
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
}
