//! Service Module
//!
//! Composes the feature store, the filters and one cache per query kind.

mod keys;
mod query;

pub use keys::{BoundingBoxKey, FullDumpKey, KeywordKey};
pub use query::QueryService;
