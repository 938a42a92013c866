//! Session cancellation endpoint.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::info;

use crate::response::json_response;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub session_id: String,
    /// Whether a request was in flight and got cancelled.
    pub cancelled: bool,
    pub message: String,
}

/// DELETE /api/sessions/:session_id
pub async fn cancel_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Response {
    let cancelled = state.sessions.cancel(&session_id);
    info!(session_id = %session_id, cancelled, "Session cancel requested");

    let message = if cancelled {
        format!("Cancelled in-flight request for session {}", session_id)
    } else {
        format!("No request in flight for session {}", session_id)
    };

    json_response(
        StatusCode::OK,
        &CancelResponse {
            success: true,
            session_id,
            cancelled,
            message,
        },
    )
}
