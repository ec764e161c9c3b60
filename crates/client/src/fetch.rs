//! Collaborators the client delegates to
//!
//! The transport, request preprocessing and status interpretation are all
//! supplied by the host; the client only orchestrates them.

use crate::errors::FetchError;
use crate::request::RequestContext;
use crate::response::Response;
use async_trait::async_trait;

/// Turns a request into a response.
///
/// Implementations own timeouts; the client forwards the configured timeout
/// through [`RequestContext::timeout`] and treats [`FetchError::Cancelled`]
/// as cancellation rather than failure.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &RequestContext) -> Result<Response, FetchError>;
}

/// Adjusts every outgoing request before it is fetched, for example to add
/// authentication headers.
pub trait RequestPreprocessor: Send + Sync {
    fn preprocess(&self, request: &mut RequestContext);
}

/// Sets a fixed header on every request.
#[derive(Debug, Clone)]
pub struct HeaderPreprocessor {
    name: String,
    value: String,
}

impl HeaderPreprocessor {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl RequestPreprocessor for HeaderPreprocessor {
    fn preprocess(&self, request: &mut RequestContext) {
        request.set_header(self.name.clone(), self.value.clone());
    }
}

/// Classifies completed responses.
pub trait StatusInspector: Send + Sync {
    /// Whether the host must be told about this response, for example
    /// because authorization expired.
    fn requires_attention(&self, response: &Response) -> bool;

    /// Whether the response may be stored in the response cache.
    fn is_cacheable(&self, response: &Response) -> bool {
        response.is_success()
    }
}

/// Flags `401 Unauthorized` and `302 Found`; caches 2xx only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusInspector;

impl StatusInspector for DefaultStatusInspector {
    fn requires_attention(&self, response: &Response) -> bool {
        matches!(response.status, 401 | 302)
    }
}
