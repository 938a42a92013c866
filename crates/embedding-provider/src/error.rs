//! Error types for embedding archive access.

use change_common::{ChangeError, ProviderCategory, MAX_YEAR, MIN_YEAR};
use thiserror::Error;

/// Errors returned by an [`EmbeddingProvider`](crate::EmbeddingProvider).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// `fetch_embedding_grid` was called before a successful `initialize`.
    #[error("provider not initialized")]
    NotInitialized,

    /// Missing, unreadable or rejected credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The archive did not answer in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The archive refused the request because of rate or usage limits.
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Any other archive or transport failure.
    #[error("archive error: {0}")]
    Unknown(String),

    /// The archive answered but the payload was unusable.
    #[error("invalid archive response: {0}")]
    InvalidResponse(String),

    /// The request itself is malformed (bounds, grid size).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No embeddings exist for the requested year.
    #[error("no embeddings for year {year} (coverage {MIN_YEAR}-{MAX_YEAR})")]
    DataUnavailable { year: i32 },

    /// The fetch was cancelled before it finished.
    #[error("fetch cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Failure category, or `None` for cancellations and caller mistakes.
    pub fn category(&self) -> Option<ProviderCategory> {
        match self {
            ProviderError::NotInitialized | ProviderError::Auth(_) => Some(ProviderCategory::Auth),
            ProviderError::Timeout(_) => Some(ProviderCategory::Timeout),
            ProviderError::Quota(_) => Some(ProviderCategory::Quota),
            ProviderError::Unknown(_) | ProviderError::InvalidResponse(_) => {
                Some(ProviderCategory::Unknown)
            }
            ProviderError::InvalidRequest(_)
            | ProviderError::DataUnavailable { .. }
            | ProviderError::Cancelled => None,
        }
    }
}

impl From<ProviderError> for ChangeError {
    fn from(err: ProviderError) -> Self {
        match err.category() {
            Some(ProviderCategory::Auth) => ChangeError::Authentication(err.to_string()),
            Some(category) => ChangeError::Connection {
                category,
                message: err.to_string(),
            },
            None => match err {
                ProviderError::Cancelled => ChangeError::Cancelled,
                other => ChangeError::Validation(other.to_string()),
            },
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
