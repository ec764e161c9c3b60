//! Item policy implementations

mod lru;
mod tlru;

pub use lru::LruPolicy;
pub use tlru::TLruPolicy;
