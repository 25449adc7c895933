//! API Handlers
//!
//! HTTP request handlers for each query endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::geo::FeatureStore;
use crate::models::{
    requests::KEYWORD_PARAM, BoundingBoxResponse, FailureResponse, HealthResponse, QueryParams,
    RedliningResponse, SearchAreasResponse, StatsResponse,
};
use crate::service::QueryService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Query service holding the feature store and caches
    pub service: Arc<QueryService>,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: QueryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The feature file is read lazily on the first request.
    pub fn from_config(config: &Config) -> Self {
        let store = FeatureStore::from_path(&config.data_path, config.load_timeout());
        Self::new(QueryService::new(Arc::new(store), config.cache_policy()))
    }
}

/// Handler for GET /boundarybox
///
/// Features fully inside the box given by `minLat`, `maxLat`, `minLng`, `maxLng`.
pub async fn boundary_box_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Arc<BoundingBoxResponse>>> {
    let response = state.service.bounding_box(&params).await.map_err(|e| {
        warn!("Bounding box query failed: {}", e);
        e
    })?;
    Ok(Json(response))
}

/// Handler for GET /searchareas
///
/// Coordinates of the areas whose description mentions `keyword`. Failures
/// echo the keyword back.
pub async fn search_areas_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> std::result::Result<Json<Arc<SearchAreasResponse>>, Json<FailureResponse>> {
    match state.service.search_areas(&params).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!("Area search failed: {}", e);
            let keyword = params.get(KEYWORD_PARAM).cloned().unwrap_or_default();
            Err(Json(FailureResponse::from_error(&e).with_keyword(keyword)))
        }
    }
}

/// Handler for GET /redliningdata
///
/// The whole feature collection.
pub async fn redlining_data_handler(
    State(state): State<AppState>,
) -> Result<Json<Arc<RedliningResponse>>> {
    let response = state.service.redlining_data().await.map_err(|e| {
        warn!("Redlining data request failed: {}", e);
        e
    })?;
    Ok(Json(response))
}

/// Handler for GET /stats
///
/// Returns statistics for every query cache.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.stats().await)
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachePolicy;
    use crate::geo::{Feature, FeatureCollection, Geometry, Position, Properties};

    fn test_state(policy: CachePolicy) -> AppState {
        let feature = Feature::new(
            Some(Geometry::Polygon {
                coordinates: vec![vec![Position::new(-79.5, 35.5)]],
            }),
            Properties::default(),
        );
        let store = FeatureStore::from_collection(FeatureCollection::new(vec![feature]));
        AppState::new(QueryService::new(Arc::new(store), policy))
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_boundary_box_handler() {
        let state = test_state(CachePolicy::default());
        let query = params(&[
            ("minLat", "35"),
            ("maxLat", "36"),
            ("minLng", "-80"),
            ("maxLng", "-79"),
        ]);

        let response = boundary_box_handler(State(state.clone()), Query(query))
            .await
            .unwrap();
        assert_eq!(response.payload.feature_list.len(), 1);
        assert_eq!(state.service.bounding_box_cache().size().await, 1);
    }

    #[tokio::test]
    async fn test_search_handler_echoes_keyword_on_error() {
        let state = test_state(CachePolicy::default());

        let err = search_areas_handler(State(state), Query(params(&[("keyword", "")])))
            .await
            .unwrap_err();
        assert_eq!(err.result, "error_bad_request");
        assert_eq!(err.keyword.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_redlining_handler() {
        let state = test_state(CachePolicy::Disabled);
        let response = redlining_data_handler(State(state)).await.unwrap();
        assert_eq!(response.payload.collection.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state(CachePolicy::default());
        let response = stats_handler(State(state)).await;
        assert!(response.caching_enabled);
        assert_eq!(response.boundarybox.hits, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
