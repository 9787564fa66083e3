//! Sequential candidate resolution.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::media::MediaKind;
use crate::metrics;
use crate::searcher::TorrentCandidate;
use crate::stream_client::{AddTorrentRequest, AddTorrentResponse, StreamBackend};

use super::files::select_file;
use super::{EpisodeTarget, ResolveError, ResolvedStream};

/// Resolves candidates against a streaming backend.
pub struct Resolver {
    backend: Arc<dyn StreamBackend>,
    config: EngineConfig,
}

impl Resolver {
    pub fn new(backend: Arc<dyn StreamBackend>, config: EngineConfig) -> Self {
        Self { backend, config }
    }

    /// Try the top candidates in order and return the first playable stream.
    ///
    /// Returns `None` when every attempt fails; there is no best-guess
    /// fallback beyond the candidates given.
    pub async fn resolve(
        &self,
        candidates: &[TorrentCandidate],
        target: &EpisodeTarget,
    ) -> Option<ResolvedStream> {
        let to_try = &candidates[..candidates.len().min(self.config.max_attempts)];

        for (attempt, candidate) in to_try.iter().enumerate() {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay()).await;
            }

            match self.resolve_candidate(candidate, target).await {
                Ok(stream) => return Some(stream),
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        of = to_try.len(),
                        name = %candidate.name,
                        error = %e,
                        "Candidate failed to resolve"
                    );
                }
            }
        }

        None
    }

    /// Add one candidate to the backend and pick its stream.
    pub async fn resolve_candidate(
        &self,
        candidate: &TorrentCandidate,
        target: &EpisodeTarget,
    ) -> Result<ResolvedStream, ResolveError> {
        let mut request = AddTorrentRequest::magnet(&candidate.magnet_link);
        if target.kind == MediaKind::Anime {
            if let Some(episode) = target.episode {
                request = request.with_episode(episode);
            }
        }

        let result = match self.backend.add_torrent(&request).await {
            Ok(response) => self.stream_from_response(response, target),
            Err(e) => Err(ResolveError::from(e)),
        };

        let label = match &result {
            Ok(ResolvedStream::Debrid { .. }) => "debrid",
            Ok(ResolvedStream::P2p { .. }) => "p2p",
            Err(_) => "failed",
        };
        metrics::RESOLUTION_ATTEMPTS.with_label_values(&[label]).inc();

        if let Ok(stream) = &result {
            info!(
                name = %candidate.name,
                debrid = stream.is_debrid(),
                url = %stream.stream_url(),
                "Resolved stream"
            );
        }
        result
    }

    fn stream_from_response(
        &self,
        response: AddTorrentResponse,
        target: &EpisodeTarget,
    ) -> Result<ResolvedStream, ResolveError> {
        if let Some(url) = response.debrid_url() {
            return Ok(ResolvedStream::Debrid {
                stream_url: url.to_string(),
                service_name: response.service.clone(),
                subtitles: response.subtitles.clone(),
            });
        }

        if response.files.is_empty() {
            return Err(ResolveError::NoFiles);
        }

        let file = select_file(&response.files, response.selected_file_index, target)
            .ok_or(ResolveError::NoVideoFiles)?;

        if response.hash.is_empty() {
            return Err(ResolveError::MissingHash);
        }

        debug!(
            hash = %response.hash,
            file = %file.name,
            index = file.index,
            "Selected file"
        );

        Ok(ResolvedStream::P2p {
            stream_url: self.backend.stream_url(&response.hash, file.index),
            torrent_hash: response.hash.clone(),
            selected_file_index: file.index,
            file_name: file.name.clone(),
        })
    }
}
