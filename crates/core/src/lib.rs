pub mod config;
pub mod engine;
pub mod matcher;
pub mod media;
pub mod metrics;
pub mod resolver;
pub mod searcher;
pub mod stream_client;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, BackendConfig, Config, ConfigError,
    EngineConfig, ServerConfig,
};
pub use engine::{CacheKey, PlaybackSession, StreamEngine, SwitchError};
pub use media::{MediaDescriptor, MediaKind};
pub use resolver::ResolvedStream;
pub use searcher::{HttpSearcher, Searcher, TorrentCandidate};
pub use stream_client::{HttpStreamBackend, StreamBackend};
