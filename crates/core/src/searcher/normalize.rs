//! Search response normalization.
//!
//! The backend has shipped several response shapes over time. Every field is
//! resolved from an ordered list of candidate keys; the first present,
//! well-typed value wins.
//!
//! | Field            | Keys (in priority order)             |
//! |------------------|--------------------------------------|
//! | result list      | `data.torrents`, `torrents`, `data`, top-level array |
//! | name             | `name`, `title`                      |
//! | magnet link      | `magnet`, `magnetLink`, `magnetURI`  |
//! | size in bytes    | `size`, `sizeBytes`                  |
//! | seeders          | `seeders`, `seeds`                   |
//! | score            | `score`                              |
//! | quality          | `quality`                            |
//! | source           | `source`                             |
//! | audio language   | `audioLanguage`, `language`          |
//! | audio codec      | `audioCodec`                         |
//!
//! Labels the backend leaves out are filled in from the release name.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use tracing::debug;

use crate::matcher::ReleaseInfo;

use super::TorrentCandidate;

static HUMAN_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([\d.,]+)\s*(b|bytes|[kmgt]i?b)?\s*$").unwrap()
});

/// Extract candidates from a search response body.
///
/// Entries without a magnet link are dropped: they cannot be resolved.
pub fn candidates_from_response(body: &Value) -> Vec<TorrentCandidate> {
    let Some(entries) = result_list(body) else {
        debug!("Search response has no recognizable result list");
        return Vec::new();
    };

    entries.iter().filter_map(candidate_from_entry).collect()
}

fn result_list(body: &Value) -> Option<&Vec<Value>> {
    body.pointer("/data/torrents")
        .and_then(Value::as_array)
        .or_else(|| body.get("torrents").and_then(Value::as_array))
        .or_else(|| body.get("data").and_then(Value::as_array))
        .or_else(|| body.as_array())
}

fn candidate_from_entry(entry: &Value) -> Option<TorrentCandidate> {
    let magnet_link = first_string(entry, &["magnet", "magnetLink", "magnetURI"])?;
    let name = first_string(entry, &["name", "title"]).unwrap_or_default();

    let size_bytes = ["size", "sizeBytes"]
        .iter()
        .find_map(|k| entry.get(*k).and_then(parse_size))
        .unwrap_or(0);
    let seeders = ["seeders", "seeds"]
        .iter()
        .find_map(|k| entry.get(*k).and_then(as_count))
        .unwrap_or(0);
    let score = entry.get("score").and_then(as_f64).unwrap_or(0.0);

    let release = ReleaseInfo::parse(&name);

    Some(TorrentCandidate {
        quality: first_string(entry, &["quality"]).or(release.quality),
        source: first_string(entry, &["source"]).or(release.source),
        audio_language: first_string(entry, &["audioLanguage", "language"])
            .or(release.audio_language),
        audio_codec: first_string(entry, &["audioCodec"])
            .or_else(|| release.codecs.audio_label().map(str::to_string)),
        name,
        magnet_link,
        size_bytes,
        seeders,
        score,
    })
}

/// Parse a size field: a byte count, a numeric string, or a human-readable
/// string such as `"1.4 GB"` or `"700 MiB"` (binary multiples).
pub fn parse_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => parse_human_size(s),
        _ => None,
    }
}

fn parse_human_size(s: &str) -> Option<u64> {
    let caps = HUMAN_SIZE_RE.captures(s)?;
    let unit = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());

    let multiplier: f64 = match unit.as_deref() {
        None | Some("b") | Some("bytes") => 1.0,
        Some("kb") | Some("kib") => 1024.0,
        Some("mb") | Some("mib") => 1024.0 * 1024.0,
        Some("gb") | Some("gib") => 1024.0 * 1024.0 * 1024.0,
        Some("tb") | Some("tib") => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        Some(_) => return None,
    };

    // Plain byte counts may carry thousands separators; scaled values use
    // a comma as decimal separator in some locales.
    let digits = caps.get(1)?.as_str();
    let number = if multiplier == 1.0 {
        digits.replace(',', "")
    } else {
        digits.replace(',', ".")
    };

    let value: f64 = number.parse().ok()?;
    Some((value * multiplier) as u64)
}

pub(crate) fn first_string(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        entry
            .get(*k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .map(|n| n.min(u32::MAX as u64) as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
