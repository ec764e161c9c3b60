//! Item policies for the segmented cache
//!
//! Implements plain LRU and time-aware LRU routing. A policy decides whether
//! a present entry is stale and where an entry goes when it falls off the
//! tail of the hot, warm or cold segment.

mod policies;
mod traits;

// Re-export public API
pub use policies::{LruPolicy, TLruPolicy};
pub use traits::{ItemDestination, ItemPolicy};

#[cfg(test)]
mod tests;
