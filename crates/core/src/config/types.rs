use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Torrent search/stream backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend API origin (e.g., "http://localhost:8000/api").
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Timeout for a single search request in seconds (default: 30)
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u32,
    /// Timeout for a single add-torrent request in seconds (default: 45)
    #[serde(default = "default_add_timeout")]
    pub add_timeout_secs: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            search_timeout_secs: default_search_timeout(),
            add_timeout_secs: default_add_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs as u64)
    }

    pub fn add_timeout(&self) -> Duration {
        Duration::from_secs(self.add_timeout_secs as u64)
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_search_timeout() -> u32 {
    30
}

fn default_add_timeout() -> u32 {
    45
}

/// Thresholds and limits for source selection and resolution.
///
/// The seeder and match-ratio values are empirical; they are exposed here
/// so deployments can tune them without a rebuild.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Minimum seeders for a candidate found by the primary query.
    #[serde(default = "default_min_seeders")]
    pub min_seeders: u32,
    /// Minimum seeders for a candidate found by a fallback query.
    #[serde(default = "default_fallback_min_seeders")]
    pub fallback_min_seeders: u32,
    /// Minimum fraction of title words a release name must contain.
    #[serde(default = "default_min_match_ratio")]
    pub min_match_ratio: f32,
    /// Same as `min_match_ratio`, under fallback.
    #[serde(default = "default_fallback_min_match_ratio")]
    pub fallback_min_match_ratio: f32,
    /// How many top-scored candidates the resolver tries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// How many top-scored candidates are kept for manual source switching.
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
    /// Pause between failed resolution attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Resolved stream cache lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Raw candidates used unscored when filtering fails outright.
    #[serde(default = "default_degraded_candidate_count")]
    pub degraded_candidate_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_seeders: default_min_seeders(),
            fallback_min_seeders: default_fallback_min_seeders(),
            min_match_ratio: default_min_match_ratio(),
            fallback_min_match_ratio: default_fallback_min_match_ratio(),
            max_attempts: default_max_attempts(),
            max_alternatives: default_max_alternatives(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            degraded_candidate_count: default_degraded_candidate_count(),
        }
    }
}

impl EngineConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Seeder floor for the given search mode.
    pub fn seeder_threshold(&self, used_fallback: bool) -> u32 {
        if used_fallback {
            self.fallback_min_seeders
        } else {
            self.min_seeders
        }
    }

    /// Title match ratio floor for the given search mode.
    pub fn match_threshold(&self, used_fallback: bool) -> f32 {
        if used_fallback {
            self.fallback_min_match_ratio
        } else {
            self.min_match_ratio
        }
    }
}

fn default_min_seeders() -> u32 {
    5
}

fn default_fallback_min_seeders() -> u32 {
    3
}

fn default_min_match_ratio() -> f32 {
    0.3
}

fn default_fallback_min_match_ratio() -> f32 {
    0.2
}

fn default_max_attempts() -> usize {
    3
}

fn default_max_alternatives() -> usize {
    10
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_degraded_candidate_count() -> usize {
    3
}
