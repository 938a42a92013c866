//! Land Change API Service Library
//!
//! HTTP surface for embedding similarity heatmaps: two years of satellite
//! embeddings over a bounding box are compared cell by cell, and the result
//! is returned as a score grid, statistics and a geo-anchored PNG.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod response;
pub mod sessions;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router around shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Analysis
        .route(
            "/api/similarity-heatmap",
            get(handlers::heatmap::get_heatmap_handler)
                .post(handlers::heatmap::post_heatmap_handler),
        )
        .route(
            "/api/embeddings",
            get(handlers::embeddings::get_embeddings_handler)
                .post(handlers::embeddings::post_embeddings_handler),
        )
        .route(
            "/api/sessions/:session_id",
            delete(handlers::sessions::cancel_session_handler),
        )
        // Catalog
        .route(
            "/api/demo-locations",
            get(handlers::catalog::demo_locations_handler),
        )
        .route(
            "/api/analysis-types",
            get(handlers::catalog::analysis_types_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
