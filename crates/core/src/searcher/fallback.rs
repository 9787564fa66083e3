//! Fallback search strategy.
//!
//! When the primary query finds nothing, progressively simplified queries are
//! tried in order until one returns results. A season, once known, is never
//! replaced by a different one: every fallback either names that season or
//! drops the season entirely.

use tracing::{debug, info, warn};

use crate::media::{
    clean_anime_title, display_title, extract_season_from_title, title_without_season,
    MediaDescriptor, MediaKind,
};
use crate::metrics;

use super::query::{build_search_query, normalize_series_title};
use super::{SearchQuery, Searcher, TorrentCandidate};

/// Result of a search with fallback.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    /// Candidates from the first query that returned any.
    pub candidates: Vec<TorrentCandidate>,
    /// Whether the candidates came from a fallback query.
    pub used_fallback: bool,
    /// The last query tried (the successful one, if any).
    pub query: SearchQuery,
    /// Searches issued, primary included.
    pub searches: usize,
    /// Searches that failed at the transport level and were counted as empty.
    pub transport_failures: usize,
}

impl FallbackOutcome {
    /// Whether every search failed at the transport level, as opposed to
    /// at least one search completing with no results.
    pub fn backend_unreachable(&self) -> bool {
        self.candidates.is_empty() && self.searches > 0 && self.transport_failures == self.searches
    }
}

#[derive(Default)]
struct Tally {
    searches: usize,
    transport_failures: usize,
}

/// Ordered, de-duplicated fallback queries for a media item.
///
/// - Anime: cleaned title (season kept), base + "Season N", base + "SNN",
///   base, base + "Season N batch", base + "Season N complete".
/// - Show: base + "Season N", base + "SNN", base, base + "Season N complete".
/// - Movie: the title without the year.
pub fn fallback_queries(media: &MediaDescriptor, season: Option<u32>) -> Vec<String> {
    let title = display_title(media);

    let queries = match media.kind {
        MediaKind::Anime => {
            let season = extract_season_from_title(&title).or(season);
            let cleaned = clean_anime_title(&title, true);
            let base = title_without_season(&cleaned);
            match season {
                Some(n) => vec![
                    cleaned,
                    format!("{} Season {}", base, n),
                    format!("{} S{:02}", base, n),
                    base.clone(),
                    format!("{} Season {} batch", base, n),
                    format!("{} Season {} complete", base, n),
                ],
                None => vec![
                    cleaned,
                    base.clone(),
                    format!("{} batch", base),
                    format!("{} complete", base),
                ],
            }
        }
        MediaKind::Show => {
            let normalized = normalize_series_title(&title);
            let season = season.or_else(|| extract_season_from_title(&normalized));
            let base = title_without_season(&normalized);
            match season {
                Some(n) => vec![
                    format!("{} Season {}", base, n),
                    format!("{} S{:02}", base, n),
                    base.clone(),
                    format!("{} Season {} complete", base, n),
                ],
                None => vec![base.clone(), format!("{} complete", base)],
            }
        }
        MediaKind::Movie => vec![title],
    };

    let mut unique: Vec<String> = Vec::with_capacity(queries.len());
    for query in queries {
        let query = query.trim().to_string();
        if !query.is_empty() && !unique.contains(&query) {
            unique.push(query);
        }
    }
    unique
}

/// Run the primary query, then fallbacks in order until one returns results.
///
/// Transport failures are treated as "no results" and counted.
pub async fn search_with_fallback(
    searcher: &dyn Searcher,
    media: &MediaDescriptor,
    season: Option<u32>,
    episode: Option<u32>,
) -> FallbackOutcome {
    let primary = SearchQuery::primary(build_search_query(media, season, episode));
    let mut tally = Tally::default();

    let candidates = run_query(searcher, &primary, &mut tally).await;
    if !candidates.is_empty() {
        return FallbackOutcome {
            candidates,
            used_fallback: false,
            query: primary,
            searches: tally.searches,
            transport_failures: tally.transport_failures,
        };
    }

    let fallbacks: Vec<String> = fallback_queries(media, season)
        .into_iter()
        .filter(|q| *q != primary.text)
        .collect();
    debug!(
        primary = %primary.text,
        fallbacks = fallbacks.len(),
        "Primary search empty, trying fallbacks"
    );

    let mut last = primary;
    for (i, text) in fallbacks.into_iter().enumerate() {
        let query = SearchQuery::fallback(text, i + 1);
        let candidates = run_query(searcher, &query, &mut tally).await;
        if !candidates.is_empty() {
            info!(
                query = %query.text,
                rank = query.fallback_rank,
                results = candidates.len(),
                "Fallback search found results"
            );
            return FallbackOutcome {
                candidates,
                used_fallback: true,
                query,
                searches: tally.searches,
                transport_failures: tally.transport_failures,
            };
        }
        last = query;
    }

    FallbackOutcome {
        candidates: Vec::new(),
        used_fallback: last.is_fallback,
        query: last,
        searches: tally.searches,
        transport_failures: tally.transport_failures,
    }
}

async fn run_query(
    searcher: &dyn Searcher,
    query: &SearchQuery,
    tally: &mut Tally,
) -> Vec<TorrentCandidate> {
    tally.searches += 1;
    let phase = if query.is_fallback { "fallback" } else { "primary" };

    match searcher.search(&query.text).await {
        Ok(candidates) => {
            let result = if candidates.is_empty() { "empty" } else { "hit" };
            metrics::SEARCHES.with_label_values(&[phase, result]).inc();
            candidates
        }
        Err(e) => {
            warn!(
                searcher = searcher.name(),
                query = %query.text,
                error = %e,
                "Search failed, treating as no results"
            );
            metrics::SEARCHES.with_label_values(&[phase, "error"]).inc();
            tally.transport_failures += 1;
            Vec::new()
        }
    }
}
