//! Response DTOs for the query server API
//!
//! Success and failure envelopes plus the health and stats bodies.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::error::QueryError;
use crate::geo::{Feature, FeatureCollection, Position};

/// `dateTime` layout, e.g. `03/14/2024 09:26`
pub const DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Current local time rendered with [`DATE_TIME_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(DATE_TIME_FORMAT).to_string()
}

// == Success Envelope ==
/// `{ "result": "success", "dateTime": ..., <payload fields> }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessResponse<P> {
    pub result: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> SuccessResponse<P> {
    /// Wraps `payload`, stamped with the current time.
    pub fn new(payload: P) -> Self {
        Self {
            result: "success".to_string(),
            date_time: timestamp(),
            payload,
        }
    }
}

/// Features inside a bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureList {
    #[serde(rename = "featureList")]
    pub feature_list: Vec<Feature>,
}

/// Flattened coordinates of the features matching a keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatesList {
    #[serde(rename = "coordinatesList")]
    pub coordinates_list: Vec<Position>,
}

/// The whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullCollection {
    pub collection: Arc<FeatureCollection>,
}

pub type BoundingBoxResponse = SuccessResponse<FeatureList>;
pub type SearchAreasResponse = SuccessResponse<CoordinatesList>;
pub type RedliningResponse = SuccessResponse<FullCollection>;

// == Failure Envelope ==
/// `{ "result": "error_...", "error_message": ..., "keyword"?: ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResponse {
    pub result: String,
    pub error_message: String,
    /// Echo of the keyword parameter for search requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl FailureResponse {
    pub fn from_error(error: &QueryError) -> Self {
        Self {
            result: error.result_code().to_string(),
            error_message: error.to_string(),
            keyword: None,
        }
    }

    /// Adds the echoed keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

// == Stats ==
/// Counters for one query cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub total_entries: usize,
    pub in_flight: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            loads: stats.loads,
            load_failures: stats.load_failures,
            total_entries: stats.total_entries,
            in_flight: stats.in_flight,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub caching_enabled: bool,
    pub features_loaded: bool,
    pub boundarybox: CacheStatsResponse,
    pub searchareas: CacheStatsResponse,
    pub redliningdata: CacheStatsResponse,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
