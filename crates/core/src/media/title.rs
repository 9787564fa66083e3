//! Title normalization.
//!
//! Derives the canonical display title of a descriptor and the simplified
//! variants used to build fallback search queries. None of these functions
//! mutate the descriptor and none of them fail: malformed input degrades to
//! an empty or unchanged string.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{MediaDescriptor, MediaKind, MediaTitle};

static SEASON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bseason\s*(\d{1,2})\b").unwrap());

static SEASON_ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s+season\b").unwrap());

static SEASON_SHORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bS(\d{1,2})\b").unwrap());

static BRACKETED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").unwrap());

// " -Arise from the Shadow-"
static DASH_SUBTITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+-[^-]+-\s*$").unwrap());

static QUALIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:part|cour|arc)\s*\d+\b").unwrap());

static FORMAT_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bthe\s+(?:animation|movie|series)\s*$").unwrap());

/// Canonical display title for a descriptor.
///
/// Movies use the plain title, shows prefer the localized `name`, and anime
/// take the first non-empty of english, userPreferred, romaji, native.
pub fn display_title(media: &MediaDescriptor) -> String {
    let plain = match &media.title {
        MediaTitle::Plain(t) => non_empty(Some(t)),
        MediaTitle::Anime(t) => non_empty(t.english.as_ref())
            .or_else(|| non_empty(t.user_preferred.as_ref()))
            .or_else(|| non_empty(t.romaji.as_ref()))
            .or_else(|| non_empty(t.native.as_ref())),
    };

    let title = match media.kind {
        MediaKind::Show => non_empty(media.name.as_ref()).or(plain),
        MediaKind::Movie | MediaKind::Anime => plain,
    };

    title.map(|t| t.trim().to_string()).unwrap_or_default()
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Season number named in a title ("Season 2", "2nd Season", "S02").
pub fn extract_season_from_title(title: &str) -> Option<u32> {
    [&*SEASON_WORD_RE, &*SEASON_ORDINAL_RE, &*SEASON_SHORT_RE]
        .iter()
        .find_map(|re| re.captures(title))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Strip decorations from an anime title for fallback searching.
///
/// Removes bracketed/parenthetical annotations, a trailing ` -Subtitle-`,
/// `Part/Cour/Arc N` qualifiers and a trailing `The Animation/Movie/Series`.
/// With `keep_season`, a season token present in the input is re-appended if
/// the stripping removed it; without it, every season token is dropped.
pub fn clean_anime_title(title: &str, keep_season: bool) -> String {
    let season = extract_season_from_title(title);

    let cleaned = BRACKETED_RE.replace_all(title, " ");
    let cleaned = DASH_SUBTITLE_RE.replace(&cleaned, "");
    let cleaned = QUALIFIER_RE.replace_all(&cleaned, " ");
    let cleaned = collapse_whitespace(&cleaned);
    let cleaned = FORMAT_SUFFIX_RE.replace(&cleaned, "");
    let mut cleaned = trim_separators(&collapse_whitespace(&cleaned));

    if !keep_season {
        return title_without_season(&cleaned);
    }

    if let Some(n) = season {
        if extract_season_from_title(&cleaned).is_none() {
            cleaned = format!("{} Season {}", cleaned, n);
        }
    }
    cleaned
}

/// Title with every season token removed.
pub fn title_without_season(title: &str) -> String {
    let stripped = SEASON_ORDINAL_RE.replace_all(title, " ");
    let stripped = SEASON_WORD_RE.replace_all(&stripped, " ");
    let stripped = SEASON_SHORT_RE.replace_all(&stripped, " ");
    trim_separators(&collapse_whitespace(&stripped))
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trim_separators(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-' || c == ',')
        .to_string()
}
