use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default base URL of the remote post storage service.
pub const DEFAULT_API_BASE_URL: &str = "https://dev.codeleap.co.uk/careers/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Remote post storage service
    pub api_base_url: String,
    pub http_timeout: Duration,

    // Relative-age label refresh
    pub clock_tick: Duration,

    // Local session store
    pub session_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: env_or_default("API_BASE_URL", DEFAULT_API_BASE_URL),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),
            clock_tick: Duration::from_secs(parse_env_u64("CLOCK_TICK_SECS", 60)?),
            session_path: PathBuf::from(env_or_default("SESSION_PATH", "./data/session.json")),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.api_base_url),
            });
        }
        if !self.api_base_url.ends_with('/') {
            // Joining "{id}/" onto a base without a trailing slash would drop
            // the last path segment.
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URL".to_string(),
                message: "must end with '/'".to_string(),
            });
        }
        if self.clock_tick.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "CLOCK_TICK_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration for tests, isolated from the environment.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(5),
            clock_tick: Duration::from_secs(60),
            session_path: PathBuf::from("./data/test-session.json"),
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var("API_BASE_URL");
        std::env::remove_var("HTTP_TIMEOUT_SECS");
        std::env::remove_var("CLOCK_TICK_SECS");
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.clock_tick, Duration::from_secs(60));
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_parse_int_error() {
        std::env::set_var("HTTP_TIMEOUT_SECS", "not-a-number");
        let result = Config::from_env();
        std::env::remove_var("HTTP_TIMEOUT_SECS");
        assert!(matches!(result, Err(ConfigError::ParseInt { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::for_testing();
        config.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api_base_url = String::new();
        assert!(config.validate().is_err());

        config.api_base_url = "https://example.com/api".to_string();
        assert!(config.validate().is_err(), "missing trailing slash");

        config.api_base_url = "https://example.com/api/".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = Config::for_testing();
        config.clock_tick = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
