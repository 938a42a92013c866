//! Error types for similarity computation.

use change_common::ChangeError;
use thiserror::Error;

/// Errors that can occur while scoring embedding grids.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityError {
    /// The two grids do not describe the same cells.
    #[error("grid shapes differ: {field} is {reference} for the reference grid but {target} for the target grid")]
    ShapeMismatch {
        field: &'static str,
        reference: String,
        target: String,
    },

    /// The requested area exceeds the configured cap.
    #[error("area {area:.2} sq degrees exceeds limit of {limit:.2}")]
    AreaTooLarge { area: f64, limit: f64 },

    /// Point sampling was asked for an unusable number of points.
    #[error("number of points must be between 1 and {max}, got {requested}")]
    InvalidPointCount { requested: usize, max: usize },
}

impl SimilarityError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        field: &'static str,
        reference: impl ToString,
        target: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            field,
            reference: reference.to_string(),
            target: target.to_string(),
        }
    }
}

impl From<SimilarityError> for ChangeError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::ShapeMismatch { .. } => ChangeError::ShapeMismatch(err.to_string()),
            SimilarityError::AreaTooLarge { .. } | SimilarityError::InvalidPointCount { .. } => {
                ChangeError::Validation(err.to_string())
            }
        }
    }
}

/// Result type for similarity operations.
pub type Result<T> = std::result::Result<T, SimilarityError>;
