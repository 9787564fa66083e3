use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Backend URL is an http(s) origin and timeouts are non-zero
/// - Engine ratios are fractions and attempt/alternative limits are coherent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let url = config.backend.url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.url cannot be empty".to_string(),
        ));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "backend.url must be an http(s) URL, got {}",
            url
        )));
    }
    if config.backend.search_timeout_secs == 0 || config.backend.add_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend timeouts cannot be 0".to_string(),
        ));
    }

    let engine = &config.engine;
    for (name, ratio) in [
        ("engine.min_match_ratio", engine.min_match_ratio),
        ("engine.fallback_min_match_ratio", engine.fallback_min_match_ratio),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 0 and 1, got {}",
                name, ratio
            )));
        }
    }
    if engine.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "engine.max_attempts cannot be 0".to_string(),
        ));
    }
    if engine.max_alternatives < engine.max_attempts {
        return Err(ConfigError::ValidationError(
            "engine.max_alternatives cannot be smaller than engine.max_attempts".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, EngineConfig, ServerConfig};
    use std::net::IpAddr;

    #[test]
    fn test_validate_default_config() {
        tokio_test::assert_ok!(validate_config(&Config::default()));
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_non_http_backend_fails() {
        let config = Config {
            backend: BackendConfig {
                url: "ftp://example.org".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }

    #[test]
    fn test_validate_ratio_out_of_range_fails() {
        let config = Config {
            engine: EngineConfig {
                min_match_ratio: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("engine.min_match_ratio"));
    }

    #[test]
    fn test_validate_alternatives_below_attempts_fails() {
        let config = Config {
            engine: EngineConfig {
                max_attempts: 5,
                max_alternatives: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        tokio_test::assert_err!(validate_config(&config));
    }
}
