//! Normalization of loosely-shaped catalog JSON into a `MediaDescriptor`.
//!
//! Catalog providers disagree on field names (TMDB vs AniList wrappers vs
//! our own backend). Each field is resolved from a fixed priority list so
//! the rest of the engine only ever sees one shape:
//!
//! | field           | sources, in priority order                                      |
//! |-----------------|-----------------------------------------------------------------|
//! | id              | `id`, `mal_id`, `anilist_id` (string or number)                 |
//! | kind            | `type`, `media_type`, `mediaType`, then the caller's hint       |
//! | title           | object `title{romaji,english,native,userPreferred}`, `title`, `name`, `original_title`, `original_name` |
//! | name            | `name`                                                          |
//! | release year    | `releaseYear`, `year`, `release_date`, `releaseDate`, `first_air_date`, `startDate.year` |
//! | total episodes  | `totalEpisodes`, `episodes` (number), `number_of_episodes`      |
//! | seasons         | `seasons[]` with `season_number`/`seasonNumber`/`number`        |

use serde_json::Value;
use thiserror::Error;

use super::{AnimeTitles, MediaDescriptor, MediaKind, MediaTitle, SeasonSummary};

/// Errors for catalog payloads that cannot describe a playable item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogShapeError {
    #[error("Catalog item is not a JSON object")]
    NotAnObject,

    #[error("Catalog item has no identifier")]
    MissingId,

    #[error("Catalog item has no recognizable media type")]
    UnknownKind,
}

impl MediaDescriptor {
    /// Build a descriptor from catalog JSON.
    ///
    /// `kind_hint` is used when the payload itself does not say what it is
    /// (e.g., a TMDB movie detail response). A missing title is not an
    /// error: it yields an empty display title.
    pub fn from_catalog_value(
        value: &Value,
        kind_hint: Option<MediaKind>,
    ) -> Result<Self, CatalogShapeError> {
        let obj = value.as_object().ok_or(CatalogShapeError::NotAnObject)?;

        let id = ["id", "mal_id", "anilist_id"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(scalar_string))
            .ok_or(CatalogShapeError::MissingId)?;

        let kind = ["type", "media_type", "mediaType"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str).and_then(MediaKind::parse))
            .or(kind_hint)
            .ok_or(CatalogShapeError::UnknownKind)?;

        Ok(Self {
            id,
            kind,
            title: title_from(obj),
            name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            release_year: release_year_from(obj),
            total_episodes: ["totalEpisodes", "episodes", "number_of_episodes"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(as_u32)),
            seasons: seasons_from(obj),
        })
    }
}

fn title_from(obj: &serde_json::Map<String, Value>) -> MediaTitle {
    if let Some(Value::Object(bundle)) = obj.get("title") {
        let field = |k: &str| bundle.get(k).and_then(Value::as_str).map(str::to_string);
        return MediaTitle::Anime(AnimeTitles {
            romaji: field("romaji"),
            english: field("english"),
            native: field("native"),
            user_preferred: field("userPreferred"),
        });
    }

    ["title", "name", "original_title", "original_name"]
        .iter()
        .find_map(|k| {
            obj.get(*k)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .map(|s| MediaTitle::Plain(s.to_string()))
        .unwrap_or_default()
}

fn release_year_from(obj: &serde_json::Map<String, Value>) -> Option<u32> {
    ["releaseYear", "year"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(as_u32))
        .or_else(|| {
            ["release_date", "releaseDate", "first_air_date"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str).and_then(leading_year))
        })
        .or_else(|| obj.get("startDate").and_then(|d| d.get("year")).and_then(as_u32))
}

fn seasons_from(obj: &serde_json::Map<String, Value>) -> Vec<SeasonSummary> {
    let Some(Value::Array(items)) = obj.get("seasons") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let season_number = ["season_number", "seasonNumber", "number"]
                .iter()
                .find_map(|k| item.get(*k).and_then(as_u32))?;
            Some(SeasonSummary {
                season_number,
                episode_count: ["episode_count", "episodeCount"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(as_u32)),
                name: item.get("name").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn leading_year(date: &str) -> Option<u32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tmdb_show_shape() {
        let value = json!({
            "id": 1399,
            "name": "Game of Thrones",
            "original_name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "number_of_episodes": 73,
            "seasons": [
                {"season_number": 0, "episode_count": 14, "name": "Specials"},
                {"season_number": 1, "episode_count": 10, "name": "Season 1"}
            ]
        });

        let media = MediaDescriptor::from_catalog_value(&value, Some(MediaKind::Show)).unwrap();
        assert_eq!(media.id, "1399");
        assert_eq!(media.kind, MediaKind::Show);
        assert_eq!(media.title, MediaTitle::Plain("Game of Thrones".to_string()));
        assert_eq!(media.release_year, Some(2011));
        assert_eq!(media.total_episodes, Some(73));
        assert_eq!(media.seasons.len(), 2);
        assert_eq!(media.seasons[1].episode_count, Some(10));
        assert_eq!(media.display_title(), "Game of Thrones");
    }

    #[test]
    fn test_anilist_shape() {
        let value = json!({
            "id": "151807",
            "type": "ANIME",
            "title": {
                "romaji": "Ore dake Level Up na Ken",
                "english": "Solo Leveling",
                "userPreferred": "Ore dake Level Up na Ken"
            },
            "totalEpisodes": 12,
            "startDate": {"year": 2024, "month": 1}
        });

        let media = MediaDescriptor::from_catalog_value(&value, None).unwrap();
        assert_eq!(media.kind, MediaKind::Anime);
        assert_eq!(media.total_episodes, Some(12));
        assert_eq!(media.release_year, Some(2024));
        assert_eq!(media.display_title(), "Solo Leveling");
    }

    #[test]
    fn test_payload_type_overrides_hint() {
        let value = json!({"id": 603, "title": "The Matrix", "media_type": "movie", "release_date": "1999-03-30"});
        let media = MediaDescriptor::from_catalog_value(&value, Some(MediaKind::Show)).unwrap();
        assert_eq!(media.kind, MediaKind::Movie);
        assert_eq!(media.release_year, Some(1999));
    }

    #[test]
    fn test_missing_title_is_soft() {
        let value = json!({"id": 7, "type": "movie"});
        let media = MediaDescriptor::from_catalog_value(&value, None).unwrap();
        assert_eq!(media.display_title(), "");
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(
            MediaDescriptor::from_catalog_value(&json!("nope"), None),
            Err(CatalogShapeError::NotAnObject)
        );
        assert_eq!(
            MediaDescriptor::from_catalog_value(&json!({"title": "x", "type": "movie"}), None),
            Err(CatalogShapeError::MissingId)
        );
        assert_eq!(
            MediaDescriptor::from_catalog_value(&json!({"id": 1, "title": "x"}), None),
            Err(CatalogShapeError::UnknownKind)
        );
    }

    #[test]
    fn test_malformed_nested_fields_are_ignored() {
        let value = json!({
            "id": 42,
            "type": "shows",
            "name": "Severance",
            "year": "not a year",
            "seasons": [{"name": "no number"}, {"seasonNumber": "2"}]
        });
        let media = MediaDescriptor::from_catalog_value(&value, None).unwrap();
        assert_eq!(media.release_year, None);
        assert_eq!(media.seasons.len(), 1);
        assert_eq!(media.seasons[0].season_number, 2);
    }
}
