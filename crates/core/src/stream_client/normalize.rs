//! Add-torrent response normalization.
//!
//! | Field               | Keys (in priority order)                   |
//! |---------------------|--------------------------------------------|
//! | payload             | `data`, top-level object                   |
//! | hash                | `hash`, `infoHash`                         |
//! | files               | `files`                                    |
//! | file name           | `name`, `path`                             |
//! | file size           | `size`, `length`                           |
//! | file index          | `index`, `fileIndex`, else list position   |
//! | stream type         | `streamType` (`"debrid"`, anything else p2p) |
//! | stream url          | `streamUrl`, `url`                         |
//! | service             | `service`, `serviceName`                   |
//! | subtitles           | `subtitles` (objects or bare URL strings)  |
//! | selected file index | `selectedFileIndex`                        |

use serde_json::Value;

use super::{AddTorrentResponse, StreamClientError, StreamFile, StreamType, SubtitleTrack};

/// Build a response from the backend's JSON body.
pub fn add_response_from_value(body: &Value) -> Result<AddTorrentResponse, StreamClientError> {
    let payload = body
        .get("data")
        .filter(|d| d.is_object())
        .unwrap_or(body);

    if !payload.is_object() {
        return Err(StreamClientError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    }

    let stream_type = match str_field(payload, &["streamType"]).as_deref() {
        Some(t) if t.eq_ignore_ascii_case("debrid") => StreamType::Debrid,
        _ => StreamType::P2p,
    };

    let files = payload
        .get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .enumerate()
                .filter_map(|(position, f)| file_from_value(f, position))
                .collect()
        })
        .unwrap_or_default();

    let subtitles = payload
        .get("subtitles")
        .and_then(Value::as_array)
        .map(|subs| subs.iter().filter_map(subtitle_from_value).collect())
        .unwrap_or_default();

    Ok(AddTorrentResponse {
        hash: str_field(payload, &["hash", "infoHash"])
            .map(|h| h.to_lowercase())
            .unwrap_or_default(),
        name: str_field(payload, &["name"]),
        files,
        stream_type,
        stream_url: str_field(payload, &["streamUrl", "url"]),
        service: str_field(payload, &["service", "serviceName"]),
        subtitles,
        selected_file_index: payload
            .get("selectedFileIndex")
            .and_then(as_index),
    })
}

fn file_from_value(value: &Value, position: usize) -> Option<StreamFile> {
    let name = str_field(value, &["name", "path"])?;
    let size_bytes = ["size", "length"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_u64))
        .unwrap_or(0);
    let index = ["index", "fileIndex"]
        .iter()
        .find_map(|k| value.get(*k).and_then(as_index))
        .unwrap_or(position);

    Some(StreamFile {
        name,
        size_bytes,
        index,
    })
}

fn subtitle_from_value(value: &Value) -> Option<SubtitleTrack> {
    if let Some(url) = value.as_str().filter(|s| !s.is_empty()) {
        return Some(SubtitleTrack {
            url: url.to_string(),
            label: None,
            language: None,
        });
    }

    Some(SubtitleTrack {
        url: str_field(value, &["url", "src"])?,
        label: str_field(value, &["label", "name"]),
        language: str_field(value, &["language", "lang", "srclang"]),
    })
}

fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        value
            .get(*k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
