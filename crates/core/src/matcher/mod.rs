//! Compatibility filtering and scoring of search results.
//!
//! Playback happens in a plain browser video element with no transcoding,
//! so codecs the browser cannot decode are hard rejects while containers
//! that only sometimes work are a score penalty.

mod filter;
mod release;
mod score;

pub use filter::{filter_candidates, FilterError, MatchTarget, RejectReason};
pub(crate) use filter::episode_patterns;
pub use release::{CodecFlags, ReleaseInfo};
pub use score::{score_candidate, sort_by_score};

use crate::config::EngineConfig;
use crate::searcher::TorrentCandidate;

/// Filter, score and sort candidates (best first).
pub fn filter_and_score(
    candidates: Vec<TorrentCandidate>,
    target: &MatchTarget,
    config: &EngineConfig,
) -> Result<Vec<TorrentCandidate>, FilterError> {
    let mut survivors = filter_candidates(candidates, target, config)?;
    for candidate in &mut survivors {
        candidate.score = score_candidate(candidate);
    }
    sort_by_score(&mut survivors);
    Ok(survivors)
}
