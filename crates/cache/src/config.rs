//! Cache configuration with defaults and validation
use crate::core::ConcurrentTLru;
use crate::errors::{CacheError, Result, MIN_CAPACITY};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::time::Duration;

/// Default number of entries, matching the response cache of the HTTP client.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default time-to-live for cached entries
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(60);

/// Configuration for a time-aware segmented cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries held at rest
    pub capacity: usize,
    /// How long an entry stays valid after insertion, in seconds on the wire
    #[serde(with = "netcache_utils::duration_secs")]
    pub time_to_live: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            time_to_live: DEFAULT_TIME_TO_LIVE,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Check the configuration without building anything
    pub fn validate(&self) -> Result<()> {
        if self.capacity < MIN_CAPACITY {
            return Err(CacheError::InvalidCapacity {
                capacity: self.capacity,
                minimum: MIN_CAPACITY,
            });
        }
        if self.time_to_live.is_zero() {
            return Err(CacheError::configuration("time to live must be non-zero"));
        }
        Ok(())
    }

    /// Build a time-aware cache with telemetry from this configuration.
    pub fn build_tlru<K, V>(&self) -> Result<ConcurrentTLru<K, V>>
    where
        K: Eq + Hash + Clone,
    {
        self.validate()?;
        ConcurrentTLru::tlru(self.capacity, self.time_to_live)
    }
}

/// Builder for [`CacheConfig`]
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn time_to_live(mut self, time_to_live: Duration) -> Self {
        self.config.time_to_live = time_to_live;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.time_to_live, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validates() {
        let err = CacheConfig::builder().capacity(2).build().unwrap_err();
        assert!(matches!(err, CacheError::InvalidCapacity { capacity: 2, .. }));

        let err = CacheConfig::builder()
            .time_to_live(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, CacheError::Configuration { .. }));

        let config = CacheConfig::builder()
            .capacity(12)
            .time_to_live(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.capacity, 12);
    }

    #[test]
    fn test_deserialize_partial_json_uses_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"time_to_live": 30}"#).unwrap();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.time_to_live, Duration::from_secs(30));
    }

    #[test]
    fn test_build_tlru() {
        let cache = CacheConfig::default().build_tlru::<u32, String>().unwrap();
        assert_eq!(cache.capacity(), 100);
        assert_eq!(cache.policy().time_to_live(), Duration::from_secs(60));
    }
}
