//! API Routes
//!
//! Configures the Axum router with all query server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    boundary_box_handler, health_handler, redlining_data_handler, search_areas_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /redliningdata` - Full feature collection
/// - `GET /boundarybox` - Features inside a bounding box
/// - `GET /searchareas` - Coordinates of areas matching a keyword
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin and method
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/redliningdata", get(redlining_data_handler))
        .route("/boundarybox", get(boundary_box_handler))
        .route("/searchareas", get(search_areas_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
