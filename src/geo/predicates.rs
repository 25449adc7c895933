//! Geometry Predicates Module
//!
//! Bounding-box containment over feature geometry.

use serde::{Deserialize, Serialize};

use crate::geo::{Feature, Position};

// == Bounding Box ==
/// Axis-aligned latitude/longitude rectangle.
///
/// No range validation is applied: a box whose minimum exceeds its maximum
/// simply contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    // == Contains ==
    /// Inclusive on every edge, exact comparison.
    pub fn contains(&self, point: &Position) -> bool {
        self.min_lat <= point.lat
            && point.lat <= self.max_lat
            && self.min_lon <= point.lon
            && point.lon <= self.max_lon
    }
}

// == Contained In ==
/// Returns true iff every point of the feature's geometry lies inside `bbox`.
///
/// Stops at the first point outside. A feature with no points at all is
/// vacuously contained. Features without geometry also pass here; dropping
/// them is up to the caller.
pub fn contained_in(feature: &Feature, bbox: &BoundingBox) -> bool {
    match &feature.geometry {
        Some(geometry) => geometry.points().all(|point| bbox.contains(point)),
        None => true,
    }
}

// == Bounding Box Query ==
/// Keeps the features with geometry that lie entirely inside `bbox`, in input order.
pub fn bounding_box_query<'a, I>(features: I, bbox: &BoundingBox) -> Vec<Feature>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter(|feature| feature.geometry.is_some())
        .filter(|feature| contained_in(feature, bbox))
        .cloned()
        .collect()
}
