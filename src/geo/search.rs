//! Text Search Module
//!
//! Case-insensitive keyword search over area descriptions.

use crate::error::{QueryError, Result};
use crate::geo::{Feature, Position};

// == Keyword Query ==
/// Returns the features whose description text contains `keyword`, ignoring case.
///
/// Each feature's description values are scanned in file order and the scan
/// stops at the first match, so a feature appears at most once. Feature order
/// is preserved. An empty keyword is rejected.
pub fn keyword_query<'a, I>(features: I, keyword: &str) -> Result<Vec<Feature>>
where
    I: IntoIterator<Item = &'a Feature>,
{
    if keyword.is_empty() {
        return Err(QueryError::InvalidQuery(
            "Missing required parameter: keyword".to_string(),
        ));
    }

    let needle = keyword.to_lowercase();
    Ok(features
        .into_iter()
        .filter(|feature| {
            feature
                .properties
                .description_texts()
                .any(|text| text.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect())
}

// == Extract Coordinates ==
/// Flattens every point of every feature into one list, skipping features without geometry.
pub fn extract_coordinates<'a, I>(features: I) -> Vec<Position>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .flat_map(|geometry| geometry.points().copied())
        .collect()
}
