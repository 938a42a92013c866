//! JSON response bodies.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use change_common::{BoundingBox, ChangeError, Corner};
use serde::Serialize;
use similarity::{SamplePoint, SimilarityStatistics};

use crate::pipeline::{HeatmapReport, PointsReport};

/// Cell spacing in degrees.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Resolution {
    pub lat_step: f64,
    pub lon_step: f64,
}

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub success: bool,
    pub mode: &'static str,
    pub grid: Vec<Vec<Option<f32>>>,
    pub rows: usize,
    pub cols: usize,
    pub statistics: Option<SimilarityStatistics>,
    pub statistics_state: &'static str,
    pub image: String,
    pub image_width: usize,
    pub image_height: usize,
    pub corners: [Corner; 4],
    pub bounds: BoundingBox,
    pub resolution: Resolution,
    pub reference_year: i32,
    pub target_year: i32,
    pub message: String,
}

impl From<HeatmapReport> for HeatmapResponse {
    fn from(report: HeatmapReport) -> Self {
        let (lat_step, lon_step) = report.similarity.resolution();
        Self {
            success: true,
            mode: "similarity_heatmap",
            grid: report.similarity.to_rows(),
            rows: report.similarity.rows(),
            cols: report.similarity.cols(),
            statistics: report.statistics.available().copied(),
            statistics_state: report.statistics.label(),
            image: png_data_url(&report.heatmap.png),
            image_width: report.heatmap.width,
            image_height: report.heatmap.height,
            corners: report.heatmap.corners,
            bounds: *report.similarity.bounds(),
            resolution: Resolution { lat_step, lon_step },
            reference_year: report.reference_year,
            target_year: report.target_year,
            message: format!(
                "Similarity heatmap computed between {} and {}",
                report.reference_year, report.target_year
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub success: bool,
    pub mode: &'static str,
    pub data: Vec<SamplePoint>,
    pub count: usize,
    pub year: i32,
    pub bounds: BoundingBox,
    pub message: String,
}

impl PointsResponse {
    pub fn new(report: PointsReport, bounds: BoundingBox) -> Self {
        let count = report.points.len();
        Self {
            success: true,
            mode: "embeddings",
            data: report.points,
            count,
            year: report.year,
            bounds,
            message: format!("Retrieved {} embedding points for year {}", count, report.year),
        }
    }
}

/// Wrapper used by the catalog endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
    pub message: String,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_category: Option<&'static str>,
}

impl From<&ChangeError> for ErrorResponse {
    fn from(err: &ChangeError) -> Self {
        Self {
            success: false,
            error: err.summary(),
            message: err.to_string(),
            error_type: err.error_type(),
            provider_category: err.provider_category().map(|c| c.as_str()),
        }
    }
}

/// Encode a PNG as a `data:` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Build a JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(json) => (status, [(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => error_response(&ChangeError::from(e)),
    }
}

/// Failure body with the status code matching the error type.
pub fn error_response(err: &ChangeError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let json = serde_json::to_string(&ErrorResponse::from(err)).unwrap_or_default();
    (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
}
