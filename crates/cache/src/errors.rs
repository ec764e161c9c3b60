//! Error types for the cache system
//!
//! Only programming-contract violations are errors here. Misses, insertion
//! races and expiry are ordinary outcomes and are reported through return
//! values, never through [`CacheError`].

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Smallest capacity a segmented cache accepts: one slot per segment.
pub const MIN_CAPACITY: usize = 3;

/// Error type for cache construction and configuration
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Capacity cannot be split into three non-empty segments
    #[error("cache capacity must be at least {minimum}, got {capacity}")]
    InvalidCapacity { capacity: usize, minimum: usize },

    /// Any other invalid configuration value
    #[error("cache configuration error: {message}")]
    Configuration { message: String },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Use a known-good default value
    UseDefault { value: String },

    /// No automated recovery possible
    Manual { instructions: String },
}

impl CacheError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the recovery hint for this error
    #[must_use]
    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            Self::InvalidCapacity { minimum, .. } => RecoveryHint::UseDefault {
                value: minimum.to_string(),
            },
            Self::Configuration { message } => RecoveryHint::Manual {
                instructions: format!("Fix the cache configuration: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_capacity_display() {
        let err = CacheError::InvalidCapacity {
            capacity: 2,
            minimum: MIN_CAPACITY,
        };
        assert_eq!(err.to_string(), "cache capacity must be at least 3, got 2");
        assert_eq!(
            err.recovery_hint(),
            RecoveryHint::UseDefault {
                value: "3".to_string()
            }
        );
    }

    #[test]
    fn test_configuration_hint_carries_message() {
        let err = CacheError::configuration("time to live must be non-zero");
        match err.recovery_hint() {
            RecoveryHint::Manual { instructions } => {
                assert!(instructions.contains("time to live must be non-zero"))
            }
            other => panic!("unexpected hint: {other:?}"),
        }
    }
}
