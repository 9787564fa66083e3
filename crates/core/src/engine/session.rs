use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedStream;
use crate::searcher::{SearchQuery, TorrentCandidate};

/// What the engine knows about the item currently being played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// The stream being played, if resolution succeeded.
    pub stream: Option<ResolvedStream>,
    /// Top scored candidates, offered for manual source switching.
    pub alternatives: Vec<TorrentCandidate>,
    /// Query that produced the candidates.
    pub query: SearchQuery,
    pub used_fallback: bool,
    /// When the stream was last resolved or switched.
    pub updated_at: DateTime<Utc>,
}

impl PlaybackSession {
    /// Debrid streams skip peer-to-peer statistics polling.
    pub fn is_debrid(&self) -> bool {
        self.stream.as_ref().is_some_and(ResolvedStream::is_debrid)
    }
}
