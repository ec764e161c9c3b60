//! Error types for the client layer
//!
//! Cancellation is an outcome, not a failure: inside the coalescing layer it
//! travels as [`Outcome::Cancelled`](crate::Outcome::Cancelled) and only
//! becomes [`ClientError::Cancelled`] when a caller asks for a `Result`.

use netcache_cache::CacheError;
use std::sync::Arc;
use std::time::Duration;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure reported by a [`Fetcher`](crate::Fetcher)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The transport could not complete the exchange
    #[error("transport error: {message}")]
    Transport { message: String },

    /// No response arrived within the request timeout
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The transport observed cancellation
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request cancelled")]
    Cancelled,

    #[error("fetch failed: {0}")]
    Fetch(Arc<FetchError>),

    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("client configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ClientError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(err) => matches!(
                err.as_ref(),
                FetchError::Transport { .. } | FetchError::Timeout { .. }
            ),
            _ => false,
        }
    }
}

impl From<FetchError> for ClientError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(Arc::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_fetch_maps_to_cancelled() {
        assert!(matches!(
            ClientError::from(FetchError::Cancelled),
            ClientError::Cancelled
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::from(FetchError::transport("reset")).is_retryable());
        assert!(ClientError::from(FetchError::Timeout {
            after: Duration::from_secs(1)
        })
        .is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
        assert!(!ClientError::configuration("bad").is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ClientError::from(FetchError::transport("connection refused"));
        assert_eq!(
            err.to_string(),
            "fetch failed: transport error: connection refused"
        );
        let err = ClientError::from(CacheError::configuration("bad ttl"));
        assert_eq!(err.to_string(), "cache configuration error: bad ttl");
    }
}
