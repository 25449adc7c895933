//! API Module
//!
//! HTTP handlers and routing for the query server.
//!
//! # Endpoints
//! - `GET /redliningdata` - Full feature collection
//! - `GET /boundarybox?minLat&maxLat&minLng&maxLng` - Features inside a box
//! - `GET /searchareas?keyword=` - Coordinates of areas matching a keyword
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
