//! Cache Module
//!
//! Provides a generic memoizing cache with TTL expiration, LRU eviction and
//! single-flight loading.

mod entry;
mod lru;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use policy::{CachePolicy, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use stats::CacheStats;
pub use store::QueryCache;
