//! Request cache, in-flight de-duplication and playback sessions.
//!
//! `StreamEngine` is the entry point callers use: it wraps search, filtering
//! and resolution behind a per-content cache so that repeated or concurrent
//! requests for the same item cost at most one pipeline run.

mod cache;
mod session;
mod stream_engine;

pub use cache::{CacheKey, StreamCache};
pub use session::PlaybackSession;
pub use stream_engine::{StreamEngine, SwitchError};
