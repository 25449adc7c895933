//! Feature Module
//!
//! In-memory representation of the redlining GeoJSON feature collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// == Position ==
/// A single `[longitude, latitude]` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    /// Extra ordinates (altitude, measure) are ignored.
    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 numbers, got {}",
                values.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.lon, position.lat]
    }
}

/// A closed ring of positions.
pub type Ring = Vec<Position>;

// == Geometry ==
/// Polygon geometry, tagged by its GeoJSON `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    /// Iterates over every ring, across all polygons.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            Geometry::Polygon { coordinates } => Box::new(coordinates.iter()),
            Geometry::MultiPolygon { coordinates } => Box::new(coordinates.iter().flatten()),
        }
    }

    /// Iterates over every point of every ring in document order.
    pub fn points(&self) -> impl Iterator<Item = &Position> + '_ {
        self.rings().flatten()
    }
}

// == Properties ==
/// Descriptive properties attached to a redlined area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub holc_id: Option<String>,
    #[serde(default)]
    pub holc_grade: Option<String>,
    #[serde(default)]
    pub neighborhood_id: Option<i64>,
    /// Free-text survey answers, in file order
    #[serde(default)]
    pub area_description_data: Map<String, Value>,
    /// Any other keys present in the file
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Properties {
    /// String values of `area_description_data`, in insertion order.
    pub fn description_texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.area_description_data.values().filter_map(Value::as_str)
    }
}

// == Feature ==
/// One polygon-annotated map region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: Properties) -> Self {
        Self {
            kind: feature_type(),
            geometry,
            properties,
        }
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

// == Feature Collection ==
/// Ordered, immutable set of features loaded from one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}
