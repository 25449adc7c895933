//! Request and Response models for the query server API
//!
//! Parameter parsing for incoming query strings and the JSON envelopes sent back.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{parse_bounding_box, parse_keyword, QueryParams};
pub use responses::{
    BoundingBoxResponse, CacheStatsResponse, CoordinatesList, FailureResponse, FeatureList,
    FullCollection, HealthResponse, RedliningResponse, SearchAreasResponse, StatsResponse,
    SuccessResponse,
};
