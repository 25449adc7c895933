//! Redline Maps - query server for redlining area descriptions
//!
//! Answers bounding-box, keyword and full-dataset queries over a GeoJSON
//! feature file, memoizing each query kind in a bounded, expiring cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use error::QueryError;
pub use service::QueryService;
