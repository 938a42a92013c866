//! Demo locations and supported analysis types.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::config::DemoLocation;
use crate::response::ListResponse;
use crate::state::AppState;

/// One analysis mode clients can request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisType {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
}

pub const ANALYSIS_TYPES: &[AnalysisType] = &[
    AnalysisType {
        kind: "similarity_heatmap",
        name: "Similarity Heatmap",
        description: "Compare satellite embeddings between two years to identify changes",
        parameters: &["bounds", "reference_year", "target_year"],
    },
    AnalysisType {
        kind: "embeddings",
        name: "Satellite Embeddings",
        description: "Extract satellite embedding vectors for a specific area and year",
        parameters: &["bounds", "year", "num_points"],
    },
    AnalysisType {
        kind: "land_use_classification",
        name: "Land Use Classification",
        description: "Classify land use types from embedding characteristics",
        parameters: &["bounds", "year"],
    },
];

/// GET /api/demo-locations
pub async fn demo_locations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ListResponse<DemoLocation>> {
    Json(ListResponse::new(
        state.demo_locations.clone(),
        "Retrieved demo locations for similarity analysis",
    ))
}

/// GET /api/analysis-types
pub async fn analysis_types_handler() -> Json<ListResponse<AnalysisType>> {
    Json(ListResponse::new(
        ANALYSIS_TYPES.to_vec(),
        "Retrieved supported analysis types",
    ))
}
