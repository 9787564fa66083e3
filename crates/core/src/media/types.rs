//! Types describing a playable catalog item.

use serde::{Deserialize, Serialize};

/// Catalog category of a media item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[serde(alias = "movies", alias = "film")]
    Movie,
    #[serde(alias = "shows", alias = "tv", alias = "series")]
    Show,
    Anime,
}

impl MediaKind {
    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
            MediaKind::Anime => "anime",
        }
    }

    /// Parse a loosely-spelled category name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" => Some(MediaKind::Movie),
            "show" | "shows" | "tv" | "series" => Some(MediaKind::Show),
            "anime" => Some(MediaKind::Anime),
            _ => None,
        }
    }
}

/// The title bundle an anime catalog provides. Any field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeTitles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romaji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_preferred: Option<String>,
}

/// Either a plain title or an anime title bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MediaTitle {
    Plain(String),
    Anime(AnimeTitles),
}

impl Default for MediaTitle {
    fn default() -> Self {
        MediaTitle::Plain(String::new())
    }
}

/// One season of a show, as listed by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonSummary {
    pub season_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A catalog item the engine can find sources for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaDescriptor {
    /// Opaque catalog identifier, unique within its kind.
    pub id: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub title: MediaTitle,
    /// Localized show name; preferred over `title` for shows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<SeasonSummary>,
}

impl MediaDescriptor {
    /// A movie with a plain title.
    pub fn movie(id: impl Into<String>, title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Movie,
            title: MediaTitle::Plain(title.into()),
            name: None,
            release_year: year,
            total_episodes: None,
            seasons: Vec::new(),
        }
    }

    /// A show with a plain title.
    pub fn show(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Show,
            title: MediaTitle::Plain(title.into()),
            name: None,
            release_year: None,
            total_episodes: None,
            seasons: Vec::new(),
        }
    }

    /// An anime with the given title bundle.
    pub fn anime(id: impl Into<String>, titles: AnimeTitles) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Anime,
            title: MediaTitle::Anime(titles),
            name: None,
            release_year: None,
            total_episodes: None,
            seasons: Vec::new(),
        }
    }

    pub fn is_anime(&self) -> bool {
        self.kind == MediaKind::Anime
    }

    /// Canonical display title (see [`crate::media::display_title`]).
    pub fn display_title(&self) -> String {
        super::display_title(self)
    }
}
