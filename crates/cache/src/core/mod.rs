//! Segmented concurrent store
//!
//! Entries live in a concurrent key map and in exactly one of three FIFO
//! segments. Reads are lock-free apart from the per-entry value lock; the
//! segments are reorganised only when an insert cycles them.

mod builder;
mod capacity;
mod cycle;
mod operations;
mod segment;
mod types;

pub use capacity::SegmentCapacity;
pub use types::{ConcurrentLru, ConcurrentTLru, SegmentedCache};

#[cfg(test)]
mod tests;
