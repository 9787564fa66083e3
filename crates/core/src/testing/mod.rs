//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the searcher and streaming
//! backend traits, allowing the whole pipeline to run without a real backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use streamseek_core::testing::{fixtures, MockSearcher, MockStreamBackend};
//!
//! let searcher = MockSearcher::new();
//! let backend = MockStreamBackend::new();
//!
//! searcher.set_results(vec![fixtures::candidate("Movie.2024.mp4", "abc", 20)]).await;
//! backend.set_response(
//!     "magnet:?xt=urn:btih:abc",
//!     fixtures::p2p_response("abc", &[("Movie.2024.mp4", 1_000)]),
//! ).await;
//!
//! // Use in StreamEngine::new...
//! ```

mod mock_searcher;
mod mock_stream_backend;

pub use mock_searcher::{MockSearcher, RecordedSearch};
pub use mock_stream_backend::{MockStreamBackend, RecordedAddTorrent, MOCK_BACKEND_URL};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::media::{AnimeTitles, MediaDescriptor, SeasonSummary};
    use crate::searcher::TorrentCandidate;
    use crate::stream_client::{AddTorrentResponse, StreamFile, StreamType, SubtitleTrack};

    /// Create a test torrent candidate with reasonable defaults.
    pub fn candidate(name: &str, info_hash: &str, seeders: u32) -> TorrentCandidate {
        TorrentCandidate {
            name: name.to_string(),
            magnet_link: format!("magnet:?xt=urn:btih:{}", info_hash),
            size_bytes: 1024 * 1024 * 1024, // 1 GB
            seeders,
            score: 0.0,
            quality: None,
            source: None,
            audio_language: None,
            audio_codec: None,
        }
    }

    /// A peer-to-peer add response; file indexes follow list order.
    pub fn p2p_response(hash: &str, files: &[(&str, u64)]) -> AddTorrentResponse {
        AddTorrentResponse {
            hash: hash.to_string(),
            name: files.first().map(|(name, _)| name.to_string()),
            files: files
                .iter()
                .enumerate()
                .map(|(index, (name, size))| StreamFile {
                    name: name.to_string(),
                    size_bytes: *size,
                    index,
                })
                .collect(),
            stream_type: StreamType::P2p,
            ..Default::default()
        }
    }

    /// A debrid add response with one English subtitle track.
    pub fn debrid_response(url: &str) -> AddTorrentResponse {
        AddTorrentResponse {
            hash: "debrid".to_string(),
            stream_type: StreamType::Debrid,
            stream_url: Some(url.to_string()),
            service: Some("RealDebrid".to_string()),
            subtitles: vec![SubtitleTrack {
                url: format!("{}.en.srt", url.trim_end_matches(".mp4")),
                label: Some("English".to_string()),
                language: Some("en".to_string()),
            }],
            ..Default::default()
        }
    }

    /// A show with the given number of ten-episode seasons.
    pub fn show(id: &str, title: &str, seasons: u32) -> MediaDescriptor {
        let mut media = MediaDescriptor::show(id, title);
        media.seasons = (1..=seasons)
            .map(|season_number| SeasonSummary {
                season_number,
                episode_count: Some(10),
                name: Some(format!("Season {}", season_number)),
            })
            .collect();
        media
    }

    /// An anime with romaji and English titles.
    pub fn anime(id: &str, romaji: &str, english: Option<&str>) -> MediaDescriptor {
        MediaDescriptor::anime(
            id,
            AnimeTitles {
                romaji: Some(romaji.to_string()),
                english: english.map(str::to_string),
                ..Default::default()
            },
        )
    }
}
