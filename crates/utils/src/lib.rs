//! Shared utilities for netcache
//!
//! This crate holds the pieces every other workspace member needs but that
//! carry no caching semantics of their own: the tracing subscriber bootstrap
//! and serde helpers for configuration types.

pub mod serde_helpers;
pub mod tracing;

pub use serde_helpers::*;
