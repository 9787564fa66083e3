//! Types for the torrent streaming backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the streaming backend.
#[derive(Debug, Clone, Error)]
pub enum StreamClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// Request to add a torrent for streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTorrentRequest {
    /// Magnet URI.
    #[serde(rename = "magnetURI")]
    pub magnet_uri: String,
    /// Episode hint so the backend can pick the file inside a batch.
    #[serde(rename = "episodeInfo", skip_serializing_if = "Option::is_none")]
    pub episode_info: Option<EpisodeInfo>,
}

impl AddTorrentRequest {
    /// Create a magnet request without an episode hint.
    pub fn magnet(uri: impl Into<String>) -> Self {
        Self {
            magnet_uri: uri.into(),
            episode_info: None,
        }
    }

    /// Attach an episode hint.
    pub fn with_episode(mut self, episode: u32) -> Self {
        self.episode_info = Some(EpisodeInfo { episode });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    pub episode: u32,
}

/// How the backend will deliver the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    /// Direct HTTP URL from a caching service; playable immediately.
    Debrid,
    /// Proxied by the backend from the swarm.
    #[default]
    P2p,
}

/// A file inside an added torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFile {
    pub name: String,
    pub size_bytes: u64,
    /// Index the backend uses in stream URLs.
    pub index: usize,
}

/// A subtitle track bundled with a debrid stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Result of adding a torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTorrentResponse {
    /// Info hash of the added torrent (may be empty for debrid responses).
    pub hash: String,
    pub name: Option<String>,
    pub files: Vec<StreamFile>,
    pub stream_type: StreamType,
    pub stream_url: Option<String>,
    /// Debrid service that served the stream.
    pub service: Option<String>,
    pub subtitles: Vec<SubtitleTrack>,
    /// File the backend picked for the requested episode.
    pub selected_file_index: Option<usize>,
}

impl AddTorrentResponse {
    /// The direct URL, if this is a usable debrid response.
    pub fn debrid_url(&self) -> Option<&str> {
        match self.stream_type {
            StreamType::Debrid => self.stream_url.as_deref().filter(|u| !u.is_empty()),
            StreamType::P2p => None,
        }
    }
}

/// Trait for torrent streaming backends.
#[async_trait]
pub trait StreamBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Add a torrent and return its stream details.
    async fn add_torrent(
        &self,
        request: &AddTorrentRequest,
    ) -> Result<AddTorrentResponse, StreamClientError>;

    /// URL that streams one file of an added torrent.
    fn stream_url(&self, hash: &str, file_index: usize) -> String;
}
