//! HTTP request handlers for the change API.

pub mod catalog;
pub mod embeddings;
pub mod health;
pub mod heatmap;
pub mod sessions;

use axum::http::HeaderMap;
use axum::response::Response;
use change_common::{BoundingBox, ChangeError, ChangeResult};
use tracing::{error, info, warn};

use crate::metrics;
use crate::response::error_response;
use crate::sessions::SESSION_HEADER;

/// Session id sent by the client, if any.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Bounds from the four query parameters. All of them are required.
pub(crate) fn bounds_from_query(
    north: Option<f64>,
    south: Option<f64>,
    east: Option<f64>,
    west: Option<f64>,
) -> ChangeResult<BoundingBox> {
    match (north, south, east, west) {
        (Some(n), Some(s), Some(e), Some(w)) => Ok(BoundingBox::new(n, s, e, w)),
        _ => Err(ChangeError::Validation(
            "north, south, east and west query parameters are required".to_string(),
        )),
    }
}

/// Log, count and render a failed request.
pub(crate) fn failure(endpoint: &'static str, err: &ChangeError) -> Response {
    match err {
        ChangeError::Validation(msg) => warn!(endpoint, error = %msg, "Rejected request"),
        ChangeError::Cancelled => info!(endpoint, "Request cancelled"),
        _ => error!(endpoint, error = %err, error_type = err.error_type(), "Request failed"),
    }
    metrics::record_request(endpoint, err.error_type());
    error_response(err)
}
