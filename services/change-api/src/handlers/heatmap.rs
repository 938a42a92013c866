//! Similarity heatmap endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use change_common::{ChangeError, ChangeResult};
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use super::{bounds_from_query, failure, session_id};
use crate::metrics;
use crate::pipeline::HeatmapRequest;
use crate::response::{json_response, HeatmapResponse};
use crate::state::AppState;

const ENDPOINT: &str = "similarity_heatmap";

/// Reference year used when a GET request omits it.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2022;

/// Target year used when a GET request omits it.
pub const DEFAULT_TARGET_YEAR: i32 = 2023;

/// Query parameters of `GET /api/similarity-heatmap`.
#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub reference_year: Option<i32>,
    pub target_year: Option<i32>,
}

impl HeatmapQuery {
    pub fn into_request(self) -> ChangeResult<HeatmapRequest> {
        Ok(HeatmapRequest {
            bounds: bounds_from_query(self.north, self.south, self.east, self.west)?,
            reference_year: self.reference_year.unwrap_or(DEFAULT_REFERENCE_YEAR),
            target_year: self.target_year.unwrap_or(DEFAULT_TARGET_YEAR),
        })
    }
}

/// GET /api/similarity-heatmap
pub async fn get_heatmap_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Response {
    let request = query
        .map_err(|e| ChangeError::Validation(e.body_text()))
        .and_then(|Query(q)| q.into_request());
    heatmap(&state, &headers, request).await
}

/// POST /api/similarity-heatmap
///
/// Body: `{bounds, reference_year, target_year}`. Both years are required.
pub async fn post_heatmap_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<HeatmapRequest>, JsonRejection>,
) -> Response {
    let request = body
        .map(|Json(req)| req)
        .map_err(|e| ChangeError::Validation(e.body_text()));
    heatmap(&state, &headers, request).await
}

async fn heatmap(
    state: &AppState,
    headers: &HeaderMap,
    request: ChangeResult<HeatmapRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let session = session_id(headers);
    let span = info_span!("heatmap", %request_id, session = session.unwrap_or("-"));

    async move {
        let request = match request {
            Ok(req) => req,
            Err(e) => return failure(ENDPOINT, &e),
        };
        debug!(bounds = ?request.bounds, "Heatmap requested");

        let guard = state.sessions.register(session);
        match state.pipeline.run_heatmap(request, guard.token()).await {
            Ok(report) => {
                metrics::record_request(ENDPOINT, "success");
                json_response(StatusCode::OK, &HeatmapResponse::from(report))
            }
            Err(e) => failure(ENDPOINT, &e),
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_years() {
        let query = HeatmapQuery {
            north: Some(37.0),
            south: Some(36.0),
            east: Some(-120.5),
            west: Some(-121.5),
            ..HeatmapQuery::default()
        };
        let req = query.into_request().unwrap();
        assert_eq!(req.reference_year, 2022);
        assert_eq!(req.target_year, 2023);
    }

    #[test]
    fn test_query_missing_bounds() {
        let query = HeatmapQuery {
            north: Some(37.0),
            ..HeatmapQuery::default()
        };
        assert!(matches!(
            query.into_request(),
            Err(ChangeError::Validation(_))
        ));
    }

    #[test]
    fn test_post_body_requires_years() {
        let body = r#"{"bounds": {"north": 1.0, "south": 0.0, "east": 1.0, "west": 0.0}}"#;
        assert!(serde_json::from_str::<HeatmapRequest>(body).is_err());
    }
}
