//! Request context
//!
//! A [`RequestContext`] carries everything the fetcher needs and everything
//! the fingerprint is derived from. The final URL is computed once at
//! construction: `base/path?query` for GET, `base/path` otherwise.

mod path;
mod query;

pub use path::normalize_path;
pub use query::{QueryParams, QueryValue, ToQuery};

use crate::fingerprint::Fingerprint;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// HTTP verbs the client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the body is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json; charset=UTF-8`
    #[default]
    Json,
    /// Multipart upload
    Stream,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Form => "application/x-www-form-urlencoded",
            Self::Json => "application/json; charset=UTF-8",
            Self::Stream => "multipart/form-data",
        }
    }
}

/// A fully described outgoing request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    base_path: String,
    path: String,
    query: QueryParams,
    body: Option<Bytes>,
    content_type: ContentType,
    headers: BTreeMap<String, String>,
    timeout: Option<Duration>,
    final_path: String,
}

impl RequestContext {
    pub fn new(method: Method, base_path: &str, path: &str) -> Self {
        Self::with_query(method, base_path, path, QueryParams::new())
    }

    /// Build a request with query parameters. Only GET requests put them in
    /// the URL.
    pub fn with_query(method: Method, base_path: &str, path: &str, query: QueryParams) -> Self {
        let base_path = normalize_path(base_path);
        let path = normalize_path(path);

        let mut final_path = path::join(&base_path, &path);
        if method == Method::Get && !query.is_empty() {
            final_path.push('?');
            final_path.push_str(&query.encode());
        }

        Self {
            method,
            base_path,
            path,
            query,
            body: None,
            content_type: ContentType::default(),
            headers: BTreeMap::new(),
            timeout: None,
            final_path,
        }
    }

    /// Attach a body.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: ContentType) -> Self {
        self.body = Some(body.into());
        self.content_type = content_type;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn final_path(&self) -> &str {
        &self.final_path
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Identity of this request for caching and coalescing.
    ///
    /// Headers and timeout are excluded: they are transport concerns that
    /// preprocessors may change per attempt.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            self.method.as_str(),
            &self.base_path,
            &self.path,
            &self.query.encode(),
            self.body.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_puts_query_in_final_path() {
        let query = QueryParams::new().param("page", 2u32);
        let request = RequestContext::with_query(Method::Get, " https://host/api/ ", "\\users\\", query);
        assert_eq!(request.final_path(), "https://host/api/users?page=2");
    }

    #[test]
    fn test_non_get_omits_query() {
        let query = QueryParams::new().param("page", 2u32);
        let request = RequestContext::with_query(Method::Post, "https://host/api", "users", query);
        assert_eq!(request.final_path(), "https://host/api/users");
    }

    #[test]
    fn test_get_without_params_has_no_question_mark() {
        let request = RequestContext::new(Method::Get, "https://host", "status");
        assert_eq!(request.final_path(), "https://host/status");
    }

    #[test]
    fn test_equivalent_spellings_share_fingerprint() {
        let a = RequestContext::new(Method::Get, "https://host/", "users/");
        let b = RequestContext::new(Method::Get, "https://host", " users ");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_headers_but_not_body() {
        let mut a = RequestContext::new(Method::Post, "https://host", "users").body("{}", ContentType::Json);
        let b = a.clone();
        a.set_header("authorization", "Bearer x");
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = RequestContext::new(Method::Post, "https://host", "users").body("{\"a\":1}", ContentType::Json);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(ContentType::Json.mime(), "application/json; charset=UTF-8");
    }
}
