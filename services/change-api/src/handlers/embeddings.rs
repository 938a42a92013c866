//! Point sampling endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use change_common::{BoundingBox, ChangeError, ChangeResult};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{bounds_from_query, failure, session_id};
use crate::metrics;
use crate::pipeline::PointsRequest;
use crate::response::{json_response, PointsResponse};
use crate::state::AppState;

const ENDPOINT: &str = "embeddings";

pub const DEFAULT_YEAR: i32 = 2023;
pub const DEFAULT_NUM_POINTS: usize = 50;

fn default_num_points() -> usize {
    DEFAULT_NUM_POINTS
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbeddingsQuery {
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub year: Option<i32>,
    pub num_points: Option<usize>,
}

impl EmbeddingsQuery {
    pub fn into_request(self) -> ChangeResult<PointsRequest> {
        Ok(PointsRequest {
            bounds: bounds_from_query(self.north, self.south, self.east, self.west)?,
            year: self.year.unwrap_or(DEFAULT_YEAR),
            num_points: self.num_points.unwrap_or(DEFAULT_NUM_POINTS),
        })
    }
}

/// JSON body of `POST /api/embeddings`.
#[derive(Debug, Deserialize)]
pub struct EmbeddingsBody {
    pub bounds: BoundingBox,
    pub year: i32,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
}

impl From<EmbeddingsBody> for PointsRequest {
    fn from(body: EmbeddingsBody) -> Self {
        PointsRequest {
            bounds: body.bounds,
            year: body.year,
            num_points: body.num_points,
        }
    }
}

/// GET /api/embeddings
pub async fn get_embeddings_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<EmbeddingsQuery>, QueryRejection>,
) -> Response {
    let request = query
        .map_err(|e| ChangeError::Validation(e.body_text()))
        .and_then(|Query(q)| q.into_request());
    embeddings(&state, &headers, request).await
}

/// POST /api/embeddings
pub async fn post_embeddings_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<EmbeddingsBody>, JsonRejection>,
) -> Response {
    let request = body
        .map(|Json(body)| PointsRequest::from(body))
        .map_err(|e| ChangeError::Validation(e.body_text()));
    embeddings(&state, &headers, request).await
}

async fn embeddings(
    state: &AppState,
    headers: &HeaderMap,
    request: ChangeResult<PointsRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let session = session_id(headers);
    let span = info_span!("embeddings", %request_id, session = session.unwrap_or("-"));

    async move {
        let request = match request {
            Ok(req) => req,
            Err(e) => return failure(ENDPOINT, &e),
        };

        let guard = state.sessions.register(session);
        match state.pipeline.run_points(request, guard.token()).await {
            Ok(report) => {
                metrics::record_request(ENDPOINT, "success");
                json_response(StatusCode::OK, &PointsResponse::new(report, request.bounds))
            }
            Err(e) => failure(ENDPOINT, &e),
        }
    }
    .instrument(span)
    .await
}
