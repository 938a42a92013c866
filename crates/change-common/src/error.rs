//! Error taxonomy surfaced to callers of the heatmap pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bbox::BboxError;
use crate::year::YearError;

/// Result type alias using ChangeError.
pub type ChangeResult<T> = Result<T, ChangeError>;

/// Machine-readable category of a failure in the embedding archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderCategory {
    Auth,
    Timeout,
    Quota,
    Unknown,
}

impl ProviderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::Auth => "AUTH",
            ProviderCategory::Timeout => "TIMEOUT",
            ProviderCategory::Quota => "QUOTA",
            ProviderCategory::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary error type for heatmap and sampling requests.
#[derive(Debug, Clone, Error)]
pub enum ChangeError {
    // === Caught before any provider call ===
    #[error("Validation failed: {0}")]
    Validation(String),

    // === Embedding archive ===
    #[error("Embedding archive authentication failed: {0}")]
    Authentication(String),

    #[error("Embedding archive unavailable ({category}): {message}")]
    Connection {
        category: ProviderCategory,
        message: String,
    },

    // === Internal invariants ===
    #[error("Embedding grids are not aligned: {0}")]
    ShapeMismatch(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChangeError {
    /// The `error_type` string reported in failure responses.
    pub fn error_type(&self) -> &'static str {
        match self {
            ChangeError::Validation(_) => "VALIDATION_ERROR",
            ChangeError::Authentication(_) => "AUTHENTICATION_ERROR",
            ChangeError::Connection { .. } => "CONNECTION_ERROR",
            ChangeError::ShapeMismatch(_) => "SHAPE_MISMATCH",
            ChangeError::Cancelled => "CANCELLED",
            ChangeError::Internal(_) => "SERVER_ERROR",
        }
    }

    /// Short human-readable summary used as the `error` field.
    pub fn summary(&self) -> &'static str {
        match self {
            ChangeError::Validation(_) => "Invalid request",
            ChangeError::Authentication(_) => "Embedding archive not configured",
            ChangeError::Connection { .. } => "Embedding archive unavailable",
            ChangeError::ShapeMismatch(_) => "Embedding grids misaligned",
            ChangeError::Cancelled => "Request cancelled",
            ChangeError::Internal(_) => "Internal server error",
        }
    }

    /// Category of the originating provider failure, if any.
    pub fn provider_category(&self) -> Option<ProviderCategory> {
        match self {
            ChangeError::Authentication(_) => Some(ProviderCategory::Auth),
            ChangeError::Connection { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ChangeError::Validation(_) => 400,
            ChangeError::Authentication(_) => 503,
            ChangeError::Connection { category, .. } => match category {
                ProviderCategory::Timeout => 504,
                ProviderCategory::Quota => 429,
                _ => 502,
            },
            ChangeError::Cancelled => 499,
            ChangeError::ShapeMismatch(_) | ChangeError::Internal(_) => 500,
        }
    }
}

impl From<BboxError> for ChangeError {
    fn from(err: BboxError) -> Self {
        ChangeError::Validation(err.to_string())
    }
}

impl From<YearError> for ChangeError {
    fn from(err: YearError) -> Self {
        ChangeError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for ChangeError {
    fn from(err: serde_json::Error) -> Self {
        ChangeError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        assert_eq!(
            ChangeError::Validation("x".into()).error_type(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ChangeError::Authentication("x".into()).error_type(),
            "AUTHENTICATION_ERROR"
        );
        assert_eq!(
            ChangeError::ShapeMismatch("x".into()).error_type(),
            "SHAPE_MISMATCH"
        );
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = ChangeError::Connection {
            category: ProviderCategory::Timeout,
            message: "slow".into(),
        };
        assert_eq!(err.error_type(), "CONNECTION_ERROR");
        assert_eq!(err.http_status_code(), 504);
        assert_eq!(err.provider_category(), Some(ProviderCategory::Timeout));
    }

    #[test]
    fn test_category_serializes_uppercase() {
        let json = serde_json::to_string(&ProviderCategory::Quota).unwrap();
        assert_eq!(json, "\"QUOTA\"");
    }
}
