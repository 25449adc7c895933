//! Cache Policy Module
//!
//! Construction-time choice between a bounded, expiring cache and pass-through.

use std::time::Duration;

/// Default maximum number of entries per cache
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

// == Cache Policy ==
/// How a [`QueryCache`](crate::cache::QueryCache) stores computed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep at most `capacity` entries, each for `ttl` after creation.
    Enabled { capacity: usize, ttl: Duration },
    /// Never store anything; every lookup runs the loader.
    Disabled,
}

impl CachePolicy {
    pub fn enabled(capacity: usize, ttl: Duration) -> Self {
        CachePolicy::Enabled { capacity, ttl }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, CachePolicy::Enabled { .. })
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::enabled(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
