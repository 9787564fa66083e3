//! Primary search query construction.
//!
//! Pure string manipulation; no I/O.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::media::{display_title, MediaDescriptor, MediaKind};

/// Long-form names rewritten to the abbreviation release groups use.
const RELEASE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Special Victims Unit", "SVU"),
    ("Marvel's Agents of S.H.I.E.L.D.", "Agents of SHIELD"),
    ("Agents of S.H.I.E.L.D.", "Agents of SHIELD"),
    ("CSI Crime Scene Investigation", "CSI"),
];

static LAW_ORDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^law order\b").unwrap());

/// Build the primary search string for a media item.
///
/// - Movie: `"{title} {year}"`
/// - Show: `"{title} S{season:02}E{episode:02}"`
/// - Anime: `"{title} {episode:03}"` (releases rarely carry a season token)
pub fn build_search_query(
    media: &MediaDescriptor,
    season: Option<u32>,
    episode: Option<u32>,
) -> String {
    let title = display_title(media);

    match media.kind {
        MediaKind::Movie => match media.release_year {
            Some(year) => format!("{} {}", title, year).trim().to_string(),
            None => title,
        },
        MediaKind::Anime => {
            let title = normalize_series_title(&title);
            match episode {
                Some(ep) => format!("{} {:03}", title, ep),
                None => title,
            }
        }
        MediaKind::Show => {
            let title = normalize_series_title(&title);
            match (season, episode) {
                (season, Some(ep)) => format!("{} S{:02}E{:02}", title, season.unwrap_or(1), ep),
                (Some(s), None) => format!("{} S{:02}", title, s),
                (None, None) => title,
            }
        }
    }
}

/// De-punctuate a series title and apply release-name conventions.
///
/// Ampersands and colons are dropped, whitespace collapsed, known long
/// names abbreviated, and a leading "Law Order" expanded to "Law and Order".
pub fn normalize_series_title(title: &str) -> String {
    let mut normalized = title.replace(['&', ':'], " ");
    for (long, short) in RELEASE_ABBREVIATIONS {
        normalized = normalized.replace(long, short);
    }
    let normalized = crate::media::collapse_whitespace(&normalized);
    LAW_ORDER_RE
        .replace(&normalized, "Law and Order")
        .into_owned()
}
