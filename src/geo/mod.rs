//! Geo Module
//!
//! Feature data model, the read-only feature store, and the containment and
//! keyword filters that run over it.

mod feature;
mod predicates;
mod search;
mod store;

pub use feature::{Feature, FeatureCollection, Geometry, Position, Properties, Ring};
pub use predicates::{bounding_box_query, contained_in, BoundingBox};
pub use search::{extract_coordinates, keyword_query};
pub use store::{read_feature_collection, FeatureStore};
