//! Resolution pipeline: turn scored candidates into a playable stream.
//!
//! Candidates are tried strictly one after another with a pause between
//! failures, so the backend never sees a burst of add requests.

mod files;
mod pipeline;
mod types;

pub use files::{is_video_file, select_file, VIDEO_EXTENSIONS};
pub use pipeline::Resolver;
pub use types::*;
