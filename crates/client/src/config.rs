//! Client configuration with defaults, builder and JSON loading
use crate::errors::{ClientError, Result};
use netcache_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-request timeout handed to the fetcher
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default buffer of the status event channel
pub const DEFAULT_STATUS_CHANNEL_CAPACITY: usize = 16;

/// Configuration for [`HttpClient`](crate::HttpClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request path is joined to
    pub base_path: String,
    /// Timeout forwarded to the fetcher, in milliseconds on the wire
    #[serde(with = "netcache_utils::duration_ms")]
    pub timeout: Duration,
    /// Response cache settings
    pub cache: CacheConfig,
    /// Attach small response bodies to completion logs
    pub log_bodies: bool,
    /// Buffered status events per subscriber before the oldest are dropped
    pub status_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            timeout: DEFAULT_TIMEOUT,
            cache: CacheConfig::default(),
            log_bodies: false,
            status_channel_capacity: DEFAULT_STATUS_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn builder(base_path: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self {
                base_path: base_path.into(),
                ..Self::default()
            },
        }
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ClientError::configuration(format!("invalid client configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_path.trim().is_empty() {
            return Err(ClientError::configuration("base_path must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::configuration("timeout must be non-zero"));
        }
        if self.status_channel_capacity == 0 {
            return Err(ClientError::configuration(
                "status_channel_capacity must be at least 1",
            ));
        }
        self.cache.validate()?;
        Ok(())
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache.capacity = capacity;
        self
    }

    pub fn cache_time_to_live(mut self, time_to_live: Duration) -> Self {
        self.config.cache.time_to_live = time_to_live;
        self
    }

    pub fn log_bodies(mut self, enabled: bool) -> Self {
        self.config.log_bodies = enabled;
        self
    }

    pub fn status_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.status_channel_capacity = capacity;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcache_cache::CacheError;

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::builder("https://api.example.com").build().unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.cache.capacity, 100);
        assert!(!config.log_bodies);
    }

    #[test]
    fn test_empty_base_path_rejected() {
        let err = ClientConfig::builder("  ").build().unwrap_err();
        assert!(matches!(err, ClientError::Configuration { .. }));
    }

    #[test]
    fn test_invalid_cache_surfaces_cache_error() {
        let err = ClientConfig::builder("https://api")
            .cache_capacity(1)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Cache(CacheError::InvalidCapacity { capacity: 1, .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let config = ClientConfig::from_json(
            r#"{
                "base_path": "https://api.example.com",
                "timeout": 1500,
                "cache": { "capacity": 30, "time_to_live": 120 },
                "log_bodies": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.cache.capacity, 30);
        assert_eq!(config.cache.time_to_live, Duration::from_secs(120));
        assert!(config.log_bodies);
        assert_eq!(config.status_channel_capacity, DEFAULT_STATUS_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_from_json_rejects_malformed_documents() {
        assert!(matches!(
            ClientConfig::from_json("{not json"),
            Err(ClientError::Configuration { .. })
        ));
        assert!(ClientConfig::from_json("{}").is_err());
    }
}
