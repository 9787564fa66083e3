use streamseek_core::{Config, StreamEngine};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: StreamEngine,
}

impl AppState {
    pub fn new(config: Config, engine: StreamEngine) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &StreamEngine {
        &self.engine
    }
}
