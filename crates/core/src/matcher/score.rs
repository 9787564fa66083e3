//! Candidate scoring.

use crate::searcher::TorrentCandidate;

use super::CodecFlags;

const MP4_BONUS: f64 = 300.0;
const COMPATIBLE_AUDIO_BONUS: f64 = 500.0;
const H264_BONUS: f64 = 200.0;
const MKV_PENALTY_FACTOR: f64 = 0.5;

/// Playback desirability, starting from the backend's own score.
///
/// MKV without explicit AAC/MP3 is halved rather than rejected: it often
/// carries audio the browser cannot play, but not always.
pub fn score_candidate(candidate: &TorrentCandidate) -> f64 {
    let codecs = CodecFlags::parse(&candidate.name);
    let mut score = candidate.score;

    if codecs.mp4 {
        score += MP4_BONUS;
    }
    if codecs.has_compatible_audio() {
        score += COMPATIBLE_AUDIO_BONUS;
    }
    if codecs.h264 {
        score += H264_BONUS;
    }
    if codecs.mkv && !codecs.has_compatible_audio() {
        score *= MKV_PENALTY_FACTOR;
    }

    score
}

/// Sort descending by score; equal scores keep their relative order.
pub fn sort_by_score(candidates: &mut [TorrentCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_mp4_beats_mkv() {
        let mp4 = fixtures::candidate("Movie.2020.1080p.WEB.mp4", "a", 10);
        let mkv = fixtures::candidate("Movie.2020.1080p.WEB.mkv", "b", 10);
        assert!(score_candidate(&mp4) > score_candidate(&mkv));
    }

    #[test]
    fn test_mkv_penalty_applies_to_backend_score() {
        let mut mkv = fixtures::candidate("Movie.2020.1080p.x264.mkv", "a", 10);
        mkv.score = 100.0;
        // (100 + 200) * 0.5
        assert_eq!(score_candidate(&mkv), 150.0);

        let mut mkv_aac = fixtures::candidate("Movie.2020.1080p.x264.AAC.mkv", "b", 10);
        mkv_aac.score = 100.0;
        assert_eq!(score_candidate(&mkv_aac), 800.0);
    }

    #[test]
    fn test_bonuses_stack() {
        let c = fixtures::candidate("Movie.2020.720p.H.264.MP3.mp4", "a", 10);
        assert_eq!(score_candidate(&c), 1000.0);

        let plain = fixtures::candidate("Movie.2020.720p", "b", 10);
        assert_eq!(score_candidate(&plain), 0.0);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut candidates = vec![
            fixtures::candidate("first", "a", 1),
            fixtures::candidate("second", "b", 1),
            fixtures::candidate("third", "c", 1),
        ];
        candidates[0].score = 10.0;
        candidates[1].score = 50.0;
        candidates[2].score = 10.0;

        sort_by_score(&mut candidates);
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first", "third"]);
    }
}
