//! Torrent streaming backend abstraction.
//!
//! This module provides a `StreamBackend` trait for handing a magnet link to
//! the streaming backend and getting back either a ready debrid URL or the
//! torrent's file list for peer-to-peer streaming.

mod http;
mod normalize;
mod types;

pub use http::HttpStreamBackend;
pub use normalize::add_response_from_value;
pub use types::*;
