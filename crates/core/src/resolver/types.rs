//! Types for stream resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::MediaKind;
use crate::stream_client::{StreamClientError, SubtitleTrack};

/// A playable stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedStream {
    /// Direct HTTP URL from a caching service.
    Debrid {
        stream_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service_name: Option<String>,
        #[serde(default)]
        subtitles: Vec<SubtitleTrack>,
    },
    /// One file of a torrent, proxied by the backend.
    P2p {
        torrent_hash: String,
        selected_file_index: usize,
        stream_url: String,
        file_name: String,
    },
}

impl ResolvedStream {
    pub fn stream_url(&self) -> &str {
        match self {
            ResolvedStream::Debrid { stream_url, .. } => stream_url,
            ResolvedStream::P2p { stream_url, .. } => stream_url,
        }
    }

    /// Debrid streams have no swarm statistics worth polling.
    pub fn is_debrid(&self) -> bool {
        matches!(self, ResolvedStream::Debrid { .. })
    }

    pub fn subtitles(&self) -> &[SubtitleTrack] {
        match self {
            ResolvedStream::Debrid { subtitles, .. } => subtitles,
            ResolvedStream::P2p { .. } => &[],
        }
    }
}

/// What is being played, for file selection and episode hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeTarget {
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Why a single candidate could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Backend request failed: {0}")]
    Backend(#[from] StreamClientError),

    #[error("Backend returned no files")]
    NoFiles,

    #[error("Torrent contains no video files")]
    NoVideoFiles,

    #[error("Backend response has no torrent hash")]
    MissingHash,
}
