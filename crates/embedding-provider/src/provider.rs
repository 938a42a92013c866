//! The provider trait and helpers shared by implementations.

use std::future::Future;

use async_trait::async_trait;
use change_common::{validate_year, BoundingBox, EmbeddingGrid, GridSize};
use tokio_util::sync::CancellationToken;

use crate::error::{ProviderError, Result};

/// Source of embedding grids for a bounding box and year.
///
/// Implementations are explicitly constructed, initialized once and shared
/// behind an `Arc<dyn EmbeddingProvider>`. They never retry; retry policy
/// belongs to the caller.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name for logs and readiness output.
    fn name(&self) -> &str;

    /// Resolve credentials and prepare connections.
    ///
    /// Must succeed before [`fetch_embedding_grid`](Self::fetch_embedding_grid)
    /// is called. Calling it again after success is a no-op.
    async fn initialize(&self) -> Result<()>;

    /// Release resources. The provider is uninitialized afterwards.
    async fn shutdown(&self);

    /// Whether `initialize` has succeeded and `shutdown` has not run since.
    fn is_initialized(&self) -> bool;

    /// Fetch a `size.rows × size.cols` grid of embeddings covering `bounds`.
    ///
    /// Row 0 is the northern edge, column 0 the western edge. Cells with
    /// no data hold the zero vector. Returns
    /// [`ProviderError::Cancelled`] as soon as `cancel` fires, without
    /// any partial grid.
    async fn fetch_embedding_grid(
        &self,
        bounds: &BoundingBox,
        year: i32,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> Result<EmbeddingGrid>;
}

/// Race `fut` against `cancel`.
///
/// Cancellation wins ties, so a token that is already cancelled never
/// lets the work start.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = fut => result,
    }
}

/// Common request checks every provider runs before doing any work.
pub fn check_request(bounds: &BoundingBox, year: i32, size: GridSize) -> Result<()> {
    validate_year(year).map_err(|_| ProviderError::DataUnavailable { year })?;
    bounds
        .validate()
        .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
    if size.rows == 0 || size.cols == 0 {
        return Err(ProviderError::InvalidRequest(format!(
            "grid size must be non-zero, got {}x{}",
            size.rows, size.cols
        )));
    }
    Ok(())
}
