//! Request parameter parsing for the query endpoints
//!
//! Turns raw query-string maps into validated query values.

use std::collections::HashMap;

use crate::error::{QueryError, Result};
use crate::geo::BoundingBox;

/// Raw query-string parameters as delivered by the transport.
pub type QueryParams = HashMap<String, String>;

/// Names of the bounding-box parameters, in key order.
pub const BOUNDING_BOX_PARAMS: [&str; 4] = ["minLat", "maxLat", "minLng", "maxLng"];

/// Name of the keyword parameter
pub const KEYWORD_PARAM: &str = "keyword";

// == Bounding Box Request ==
/// Parses `minLat`, `maxLat`, `minLng` and `maxLng` into a bounding box.
///
/// Every parameter is required and must be a finite number. No ordering check
/// is made between minimum and maximum.
pub fn parse_bounding_box(params: &QueryParams) -> Result<BoundingBox> {
    let [min_lat, max_lat, min_lon, max_lon] = BOUNDING_BOX_PARAMS.map(|name| number(params, name));
    Ok(BoundingBox::new(min_lat?, max_lat?, min_lon?, max_lon?))
}

fn number(params: &QueryParams, name: &str) -> Result<f64> {
    let raw = params
        .get(name)
        .ok_or_else(|| QueryError::InvalidQuery(format!("Missing required parameter: {}", name)))?;

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| QueryError::InvalidQuery(format!("Parameter {} is not a number: {}", name, raw)))
}

// == Search Areas Request ==
/// Returns the required, non-empty `keyword` parameter.
pub fn parse_keyword(params: &QueryParams) -> Result<String> {
    match params.get(KEYWORD_PARAM) {
        Some(keyword) if !keyword.is_empty() => Ok(keyword.clone()),
        _ => Err(QueryError::InvalidQuery(
            "Missing required parameter: keyword".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_bounding_box() {
        let p = params(&[
            ("minLat", "35.0"),
            ("maxLat", "36"),
            ("minLng", "-80.0"),
            ("maxLng", " -79.0 "),
        ]);
        assert_eq!(
            parse_bounding_box(&p).unwrap(),
            BoundingBox::new(35.0, 36.0, -80.0, -79.0)
        );
    }

    #[test]
    fn test_missing_bounding_box_param() {
        let p = params(&[("minLat", "35.0"), ("minLng", "-80.0"), ("maxLng", "-79.0")]);
        assert_eq!(
            parse_bounding_box(&p).unwrap_err(),
            QueryError::InvalidQuery("Missing required parameter: maxLat".into())
        );

        let p = params(&[("maxLat", "36.0"), ("minLng", "-80.0"), ("maxLng", "-79.0")]);
        assert_eq!(
            parse_bounding_box(&p).unwrap_err(),
            QueryError::InvalidQuery("Missing required parameter: minLat".into())
        );
    }

    #[test]
    fn test_non_numeric_bounding_box_param() {
        let p = params(&[
            ("minLat", "35.0"),
            ("maxLat", "north"),
            ("minLng", "-80.0"),
            ("maxLng", "-79.0"),
        ]);
        let err = parse_bounding_box(&p).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidQuery("Parameter maxLat is not a number: north".into())
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let p = params(&[
            ("minLat", "NaN"),
            ("maxLat", "36"),
            ("minLng", "-inf"),
            ("maxLng", "-79.0"),
        ]);
        assert!(parse_bounding_box(&p).is_err());
    }

    #[test]
    fn test_inverted_box_accepted() {
        let p = params(&[
            ("minLat", "36"),
            ("maxLat", "35"),
            ("minLng", "-79"),
            ("maxLng", "-80"),
        ]);
        assert!(parse_bounding_box(&p).is_ok());
    }

    #[test]
    fn test_parse_keyword() {
        assert_eq!(parse_keyword(&params(&[("keyword", "Club")])).unwrap(), "Club");
        assert!(parse_keyword(&params(&[("keyword", "")])).is_err());
        assert!(parse_keyword(&params(&[])).is_err());
    }
}
