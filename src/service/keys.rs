//! Cache Key Module
//!
//! Structured cache keys for each query kind.

use crate::geo::BoundingBox;

// == Bounding Box Key ==
/// Exact identity of a bounding-box query.
///
/// Holds the bit patterns of `(minLat, maxLat, minLon, maxLon)` so equality and
/// hashing are exact per component. `-0.0` is folded into `0.0` because the two
/// select the same features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBoxKey([u64; 4]);

impl BoundingBoxKey {
    pub fn new(bbox: &BoundingBox) -> Self {
        Self([bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon].map(canonical_bits))
    }
}

impl From<&BoundingBox> for BoundingBoxKey {
    fn from(bbox: &BoundingBox) -> Self {
        Self::new(bbox)
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Keyword queries are keyed by the keyword exactly as sent.
pub type KeywordKey = String;

/// The full-dataset query takes no parameters, so it has a single key.
pub type FullDumpKey = ();
