//! Media descriptors and title normalization.
//!
//! A `MediaDescriptor` is what the catalog collaborator hands the engine:
//! a movie, show, or anime with its titles and episode structure. This
//! module only reads descriptors; it never fetches them.

mod catalog;
mod title;
mod types;

pub use catalog::CatalogShapeError;
pub use title::{
    clean_anime_title, display_title, extract_season_from_title, title_without_season,
};
pub use types::*;

pub(crate) use title::collapse_whitespace;
