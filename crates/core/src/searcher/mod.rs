//! Torrent search: query construction, the backend search client, and the
//! fallback strategy used when the primary query finds nothing.
//!
//! ```text
//! MediaDescriptor ──► build_search_query ──► Searcher::search ──┐
//!                                                               │ empty?
//!                     fallback_queries ──► Searcher::search ◄───┘ (in order, first hit wins)
//! ```

mod fallback;
mod http;
mod normalize;
mod query;
mod types;

pub use fallback::{fallback_queries, search_with_fallback, FallbackOutcome};
pub use http::HttpSearcher;
pub use normalize::{candidates_from_response, parse_size};
pub use query::{build_search_query, normalize_series_title};
pub use types::*;
