//! Candidate rejection rules.
//!
//! A candidate is dropped if any rule rejects it. Adult content, AV1 video
//! and browser-incompatible audio are rejected in every mode; seeder floors,
//! title match and episode checks relax when the candidates came from a
//! fallback query.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::media::{
    clean_anime_title, display_title, title_without_season, MediaDescriptor, MediaKind,
};
use crate::metrics;
use crate::searcher::{normalize_series_title, TorrentCandidate};

use super::CodecFlags;

static ADULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:xxx|porn|porno|hentai|brazzers|onlyfans|nsfw)\b|\b18\+").unwrap()
});

static EPISODE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bs(\d{1,2})[\s._-]?e(\d{1,3})\b").unwrap());

static SEASON_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bs(\d{1,2})\s*-\s*s?(\d{1,2})\b").unwrap());

static SEASON_MENTION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bs(\d{1,2})\b",
        r"(?i)\bs(\d{1,2})e\d",
        r"(?i)\bseason[\s._-]*(\d{1,2})\b",
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)[\s._-]+season\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BATCH_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:batch|complete|season)\b").unwrap());

// Groups: open bracket, start, spacing, spacing, end, close bracket.
static EPISODE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([(\[])?\s*\b(\d{1,3})(\s*)[-~](\s*)(\d{1,3})\b\s*([)\]])?").unwrap()
});

/// Explicit markers naming a single episode.
static SINGLE_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\s-\s|\bepisode[\s._-]*|\bep\.?[\s._-]*|\bs\d{1,2}e|\be|#)\d{1,4}\b|\[\d{1,3}\]",
    )
    .unwrap()
});

/// Error raised when the filter cannot evaluate its rules.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid episode pattern: {0}")]
    Pattern(String),
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Adult,
    Av1,
    IncompatibleAudio,
    LowSeeders,
    TitleMismatch,
    WrongEpisode,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Adult => "adult",
            RejectReason::Av1 => "av1",
            RejectReason::IncompatibleAudio => "incompatible_audio",
            RejectReason::LowSeeders => "low_seeders",
            RejectReason::TitleMismatch => "title_mismatch",
            RejectReason::WrongEpisode => "wrong_episode",
        }
    }
}

/// What the candidates are being matched against.
#[derive(Debug, Clone)]
pub struct MatchTarget {
    pub kind: MediaKind,
    /// Titles whose words a release name should contain; the best ratio counts.
    pub titles: Vec<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub used_fallback: bool,
}

impl MatchTarget {
    pub fn new(
        media: &MediaDescriptor,
        season: Option<u32>,
        episode: Option<u32>,
        used_fallback: bool,
    ) -> Self {
        let canonical = display_title(media);
        let mut titles = vec![canonical.clone()];

        if media.kind != MediaKind::Movie {
            titles.push(normalize_series_title(&canonical));
        }
        if used_fallback {
            let cleaned = clean_anime_title(&canonical, true);
            titles.push(title_without_season(&cleaned));
            titles.push(cleaned);
        }
        titles.dedup();

        // Show episodes without a season are searched as season 1.
        let season = match (media.kind, season, episode) {
            (MediaKind::Show, None, Some(_)) => Some(1),
            _ => season,
        };

        Self {
            kind: media.kind,
            titles,
            season,
            episode,
            used_fallback,
        }
    }

    /// Best fraction of title words (longer than two characters) found in
    /// the name. A title with no such words matches fully.
    pub fn title_match_ratio(&self, name: &str) -> f32 {
        let name = name.to_lowercase();
        self.titles
            .iter()
            .map(|title| word_match_ratio(title, &name))
            .fold(0.0, f32::max)
    }
}

fn word_match_ratio(title: &str, lowercase_name: &str) -> f32 {
    let words: Vec<String> = title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_string)
        .collect();

    if words.is_empty() {
        return 1.0;
    }

    let matched = words
        .iter()
        .filter(|w| lowercase_name.contains(w.as_str()))
        .count();
    matched as f32 / words.len() as f32
}

/// Keep candidates that pass every rule, preserving input order.
pub fn filter_candidates(
    candidates: Vec<TorrentCandidate>,
    target: &MatchTarget,
    config: &EngineConfig,
) -> Result<Vec<TorrentCandidate>, FilterError> {
    let episode_patterns = match (target.kind, target.episode) {
        (MediaKind::Anime, Some(ep)) => episode_patterns(ep)?,
        _ => Vec::new(),
    };

    let total = candidates.len();
    let survivors: Vec<TorrentCandidate> = candidates
        .into_iter()
        .filter(|c| match rejection(c, target, config, &episode_patterns) {
            Some(reason) => {
                debug!(name = %c.name, reason = reason.as_str(), "Rejected candidate");
                metrics::CANDIDATES_REJECTED
                    .with_label_values(&[reason.as_str()])
                    .inc();
                false
            }
            None => true,
        })
        .collect();

    debug!(
        total = total,
        kept = survivors.len(),
        fallback = target.used_fallback,
        "Filtered candidates"
    );
    Ok(survivors)
}

fn rejection(
    candidate: &TorrentCandidate,
    target: &MatchTarget,
    config: &EngineConfig,
    episode_patterns: &[Regex],
) -> Option<RejectReason> {
    let name = candidate.name.as_str();

    if ADULT_RE.is_match(name) {
        return Some(RejectReason::Adult);
    }

    let codecs = CodecFlags::parse(name);
    if codecs.av1 {
        return Some(RejectReason::Av1);
    }
    if codecs.has_incompatible_audio() {
        return Some(RejectReason::IncompatibleAudio);
    }

    if candidate.seeders < config.seeder_threshold(target.used_fallback) {
        return Some(RejectReason::LowSeeders);
    }

    if target.title_match_ratio(name) < config.match_threshold(target.used_fallback) {
        return Some(RejectReason::TitleMismatch);
    }

    let episode_ok = match target.kind {
        MediaKind::Show => show_episode_ok(name, target),
        MediaKind::Anime => anime_episode_ok(name, target, episode_patterns),
        MediaKind::Movie => true,
    };
    if !episode_ok {
        return Some(RejectReason::WrongEpisode);
    }

    None
}

fn show_episode_ok(name: &str, target: &MatchTarget) -> bool {
    let Some(season) = target.season else {
        return true;
    };
    let lower = name.to_lowercase();

    if target.used_fallback {
        return lower.contains("complete") || names_season(name, season);
    }

    let exact = match target.episode {
        Some(ep) => EPISODE_MARKER_RE.captures_iter(name).any(|caps| {
            caps[1].parse::<u32>().ok() == Some(season) && caps[2].parse::<u32>().ok() == Some(ep)
        }),
        None => names_season(name, season) && !EPISODE_MARKER_RE.is_match(name),
    };

    exact || is_season_pack(name, &lower, season)
}

/// A whole-season release for the requested season.
fn is_season_pack(name: &str, lower: &str, season: u32) -> bool {
    if !(lower.contains("complete") || lower.contains("season")) {
        return false;
    }
    // Any SxxEyy left at this point names a different episode.
    if EPISODE_MARKER_RE.is_match(name) {
        return false;
    }
    let mentioned = season_mentions(name);
    mentioned.is_empty() || mentioned.iter().any(|(lo, hi)| (*lo..=*hi).contains(&season))
}

fn names_season(name: &str, season: u32) -> bool {
    season_mentions(name)
        .iter()
        .any(|(lo, hi)| (*lo..=*hi).contains(&season))
}

/// Seasons a name refers to, as inclusive ranges.
fn season_mentions(name: &str) -> Vec<(u32, u32)> {
    let mut mentions: Vec<(u32, u32)> = SEASON_RANGE_RE
        .captures_iter(name)
        .filter_map(|caps| {
            let lo = caps[1].parse().ok()?;
            let hi = caps[2].parse().ok()?;
            (lo <= hi).then_some((lo, hi))
        })
        .collect();

    for re in SEASON_MENTION_RES.iter() {
        mentions.extend(
            re.captures_iter(name)
                .filter_map(|caps| caps[1].parse().ok())
                .map(|n: u32| (n, n)),
        );
    }
    mentions
}

fn anime_episode_ok(name: &str, target: &MatchTarget, episode_patterns: &[Regex]) -> bool {
    let Some(episode) = target.episode else {
        return true;
    };

    if episode_patterns.iter().any(|re| re.is_match(name)) {
        return true;
    }

    let range = episode_range(name);
    let batch_keyword = BATCH_KEYWORD_RE.is_match(name);
    if range.is_none() && !batch_keyword {
        return false;
    }

    if target.used_fallback {
        return true;
    }

    match range {
        Some((start, end)) => (start..=end).contains(&episode),
        // A keyword alone does not make a batch of "Season 1 - 15".
        None => batch_keyword && !SINGLE_EPISODE_RE.is_match(name),
    }
}

/// An episode range such as `01-12`, `01~12` or `(1 - 12)`.
///
/// Unbracketed ranges must be zero-padded and unspaced, so `Season 1 - 15`
/// reads as episode 15 rather than episodes 1 to 15.
fn episode_range(name: &str) -> Option<(u32, u32)> {
    EPISODE_RANGE_RE.captures_iter(name).find_map(|caps| {
        let start = caps.get(2)?;
        let end = caps.get(5)?;
        let bracketed = caps.get(1).is_some() && caps.get(6).is_some();
        let padded = start.as_str().len() >= 2
            && end.as_str().len() >= 2
            && caps[3].is_empty()
            && caps[4].is_empty();
        if !(bracketed || padded) || follows_season_word(&name[..start.start()]) {
            return None;
        }

        let start: u32 = start.as_str().parse().ok()?;
        let end: u32 = end.as_str().parse().ok()?;
        (start < end).then_some((start, end))
    })
}

fn follows_season_word(prefix: &str) -> bool {
    let prefix = prefix
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-' | '(' | '['))
        .to_lowercase();
    if prefix.ends_with("season") || prefix.ends_with("part") {
        return true;
    }
    let mut chars = prefix.chars().rev();
    chars.next() == Some('s') && !chars.next().is_some_and(char::is_alphanumeric)
}

/// Zero-padding-tolerant patterns naming one episode number.
pub(crate) fn episode_patterns(episode: u32) -> Result<Vec<Regex>, FilterError> {
    [
        format!(r"(?i)\bepisode[\s._-]*0*{}\b", episode),
        format!(r"(?i)\bep\.?[\s._-]*0*{}\b", episode),
        format!(r"(?i)\be0*{}\b", episode),
        format!(r"(?i)\bs\d{{1,2}}e0*{}\b", episode),
        format!(r"\[0*{}\]", episode),
        format!(r"\s-\s0*{}\b", episode),
        format!(r"#0*{}\b", episode),
    ]
    .iter()
    .map(|p| Regex::new(p).map_err(|e| FilterError::Pattern(e.to_string())))
    .collect()
}
