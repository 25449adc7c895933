//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CachePolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the GeoJSON feature file
    pub data_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Whether query results are cached at all
    pub cache_enabled: bool,
    /// Maximum number of entries each query cache can hold
    pub max_entries: usize,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Maximum time in seconds to read the feature file
    pub load_timeout: u64,
    /// Load the feature file at startup instead of on first request
    pub preload: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATA_PATH` - Feature file (default: data/geojson/fullDownload.geojson)
    /// - `SERVER_PORT` - HTTP server port (default: 4000)
    /// - `CACHE_ENABLED` - Cache query results (default: true)
    /// - `MAX_ENTRIES` - Maximum entries per cache (default: 1000)
    /// - `CACHE_TTL` - Entry lifetime in seconds (default: 600)
    /// - `LOAD_TIMEOUT` - Feature file read timeout in seconds (default: 30)
    /// - `PRELOAD` - Read the feature file at startup (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cache_enabled: parse_var("CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            load_timeout: parse_var("LOAD_TIMEOUT").unwrap_or(defaults.load_timeout),
            preload: parse_var("PRELOAD").unwrap_or(defaults.preload),
        }
    }

    /// Cache policy shared by all query caches.
    pub fn cache_policy(&self) -> CachePolicy {
        if self.cache_enabled {
            CachePolicy::enabled(self.max_entries, Duration::from_secs(self.cache_ttl))
        } else {
            CachePolicy::Disabled
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/geojson/fullDownload.geojson"),
            server_port: 4000,
            cache_enabled: true,
            max_entries: 1000,
            cache_ttl: 600,
            load_timeout: 30,
            preload: false,
        }
    }
}
