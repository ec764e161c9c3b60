//! Request-coalescing HTTP client for netcache
//!
//! The client sits between application code and a host-supplied
//! [`Fetcher`]. It provides:
//! - Deterministic request fingerprints over method, URL, query and body
//! - A time-aware response cache with single-flight coalescing of GETs
//! - Cooperative cancellation through [`CancelHandle`] and [`CancelToken`]
//! - Status events for responses the host must react to

pub mod cancel;
pub mod client;
pub mod coalesce;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod fingerprint;
pub mod request;
pub mod response;

pub use cancel::{CancelHandle, CancelToken};
pub use client::{HttpClient, HttpClientBuilder, StatusEvent, StatusReason};
pub use coalesce::{Outcome, RequestCoalescer};
pub use config::ClientConfig;
pub use errors::{ClientError, FetchError, Result};
pub use fetch::{DefaultStatusInspector, Fetcher, HeaderPreprocessor, RequestPreprocessor, StatusInspector};
pub use fingerprint::Fingerprint;
pub use request::{ContentType, Method, QueryParams, QueryValue, RequestContext, ToQuery};
pub use response::Response;
