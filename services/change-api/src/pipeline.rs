//! The request pipeline: validate, fetch both years, score, render.
//!
//! ```text
//! bounds, years ──► validate ──► resolution policy ──► GridSize
//!                                                        │
//!        ┌───────────── try_join! (cancel + timeout) ◄───┘
//!        ▼
//!  grid_ref, grid_target ──► spawn_blocking { compute_similarity, render_heatmap }
//!                                   │
//!                                   ▼
//!                             HeatmapReport
//! ```
//!
//! Validation always runs before the provider is touched.

use std::sync::Arc;
use std::time::Duration;

use change_common::{
    validate_year, BoundingBox, ChangeError, ChangeResult, EmbeddingGrid, GridSize, YearPair,
};
use embedding_provider::{run_cancellable, EmbeddingProvider, ProviderError};
use renderer::{render_heatmap, HeatmapOptions, RenderedHeatmap};
use serde::Deserialize;
use similarity::{
    compute_similarity, lattice_size, sample_points, ResolutionPolicy, SamplePoint,
    SimilarityGrid, StatisticsState,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;
use crate::metrics::{self, Timer};

/// Inputs of a heatmap request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HeatmapRequest {
    pub bounds: BoundingBox,
    pub reference_year: i32,
    pub target_year: i32,
}

/// Everything produced for one heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapReport {
    pub similarity: SimilarityGrid,
    pub statistics: StatisticsState,
    pub heatmap: RenderedHeatmap,
    pub reference_year: i32,
    pub target_year: i32,
}

/// Inputs of a point-sampling request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsRequest {
    pub bounds: BoundingBox,
    pub year: i32,
    pub num_points: usize,
}

/// Sampled points for one year.
#[derive(Debug, Clone)]
pub struct PointsReport {
    pub year: i32,
    pub lattice: GridSize,
    pub points: Vec<SamplePoint>,
}

/// Runs heatmap and sampling requests against a provider.
pub struct Pipeline {
    provider: Arc<dyn EmbeddingProvider>,
    policy: ResolutionPolicy,
    heatmap_options: HeatmapOptions,
    provider_timeout: Duration,
    max_points: usize,
    /// Held while a lazy `initialize` is in flight.
    init_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            policy: ResolutionPolicy::with_max_area(config.max_area_sq_degrees),
            heatmap_options: HeatmapOptions {
                pixels_per_cell: config.pixels_per_cell,
                max_dimension: config.max_image_dimension,
                ..HeatmapOptions::default()
            },
            provider_timeout: config.provider_timeout,
            max_points: config.max_points,
            init_lock: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Validate a heatmap request and return the grid and years it will use.
    pub fn plan_heatmap(&self, req: &HeatmapRequest) -> ChangeResult<(GridSize, YearPair)> {
        req.bounds.validate()?;
        let years = YearPair::new(req.reference_year, req.target_year)?;
        Ok((self.policy.grid_size(&req.bounds)?, years))
    }

    /// Compute a similarity heatmap between two years.
    pub async fn run_heatmap(
        &self,
        req: HeatmapRequest,
        cancel: &CancellationToken,
    ) -> ChangeResult<HeatmapReport> {
        let (size, years) = self.plan_heatmap(&req)?;
        info!(
            rows = size.rows,
            cols = size.cols,
            reference_year = years.reference,
            target_year = years.target,
            "Computing similarity heatmap"
        );

        let (reference, target) = self
            .fetch_pair(&req.bounds, years, size, cancel)
            .await?;

        let options = self.heatmap_options.clone();
        let timer = Timer::start();
        let (similarity, statistics, heatmap) = tokio::task::spawn_blocking(move || {
            let compute = Timer::start();
            let (similarity, statistics) =
                compute_similarity(&reference, &target).map_err(|e| {
                    error!(error = %e, "Embedding grids misaligned");
                    ChangeError::from(e)
                })?;
            metrics::record_similarity_compute(compute.elapsed_secs());
            let heatmap = render_heatmap(
                similarity.scores(),
                similarity.rows(),
                similarity.cols(),
                similarity.bounds(),
                &options,
            )
            .map_err(|e| ChangeError::Internal(e.to_string()))?;
            Ok::<_, ChangeError>((similarity, statistics, heatmap))
        })
        .await
        .map_err(|e| ChangeError::Internal(format!("scoring task failed: {}", e)))??;

        // A result computed after cancellation is never returned
        if cancel.is_cancelled() {
            return Err(ChangeError::Cancelled);
        }

        metrics::record_png_bytes(heatmap.png.len());
        debug!(
            statistics = statistics.label(),
            png_bytes = heatmap.png.len(),
            elapsed_ms = timer.elapsed_ms(),
            "Heatmap ready"
        );

        Ok(HeatmapReport {
            similarity,
            statistics,
            heatmap,
            reference_year: years.reference,
            target_year: years.target,
        })
    }

    /// Validate a sampling request and return the lattice it will use.
    pub fn plan_points(&self, req: &PointsRequest) -> ChangeResult<GridSize> {
        req.bounds.validate()?;
        validate_year(req.year)?;
        self.policy.grid_size(&req.bounds)?;
        Ok(lattice_size(req.num_points, self.max_points)?)
    }

    /// Sample embeddings at lattice points for one year.
    pub async fn run_points(
        &self,
        req: PointsRequest,
        cancel: &CancellationToken,
    ) -> ChangeResult<PointsReport> {
        let lattice = self.plan_points(&req)?;
        info!(
            year = req.year,
            num_points = req.num_points,
            lattice = lattice.rows,
            "Sampling embeddings"
        );

        let grid = self.fetch_one(&req.bounds, req.year, lattice, cancel).await?;
        let num_points = req.num_points;
        let points = tokio::task::spawn_blocking(move || sample_points(&grid, num_points))
            .await
            .map_err(|e| ChangeError::Internal(format!("sampling task failed: {}", e)))?;

        if cancel.is_cancelled() {
            return Err(ChangeError::Cancelled);
        }

        Ok(PointsReport {
            year: req.year,
            lattice,
            points,
        })
    }

    /// Initialize the provider if needed. Concurrent callers share one attempt.
    async fn ensure_ready(&self) -> Result<(), ProviderError> {
        if self.provider.is_initialized() {
            return Ok(());
        }
        let _guard = self.init_lock.lock().await;
        if self.provider.is_initialized() {
            return Ok(());
        }
        warn!(provider = self.provider.name(), "Provider not initialized, retrying");
        self.provider.initialize().await
    }

    /// Fetch both years concurrently under the cancel token and timeout.
    async fn fetch_pair(
        &self,
        bounds: &BoundingBox,
        years: YearPair,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> ChangeResult<(EmbeddingGrid, EmbeddingGrid)> {
        let fetch_cancel = cancel.child_token();
        let provider = &self.provider;
        let both = async {
            tokio::try_join!(
                provider.fetch_embedding_grid(bounds, years.reference, size, &fetch_cancel),
                provider.fetch_embedding_grid(bounds, years.target, size, &fetch_cancel),
            )
        };
        self.bounded(both, &fetch_cancel).await
    }

    async fn fetch_one(
        &self,
        bounds: &BoundingBox,
        year: i32,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> ChangeResult<EmbeddingGrid> {
        let fetch_cancel = cancel.child_token();
        let fetch = self
            .provider
            .fetch_embedding_grid(bounds, year, size, &fetch_cancel);
        self.bounded(fetch, &fetch_cancel).await
    }

    /// Race lazy initialization plus a provider future against cancellation
    /// and the timeout.
    async fn bounded<T, F>(&self, fut: F, cancel: &CancellationToken) -> ChangeResult<T>
    where
        F: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let timer = Timer::start();
        let work = async {
            self.ensure_ready().await?;
            fut.await
        };
        let result = tokio::time::timeout(self.provider_timeout, run_cancellable(cancel, work)).await;
        metrics::record_provider_fetch(timer.elapsed_secs());

        match result {
            Ok(inner) => Ok(inner?),
            Err(_) => {
                cancel.cancel();
                warn!(
                    timeout_secs = self.provider_timeout.as_secs_f64(),
                    "Embedding provider timed out"
                );
                Err(ProviderError::Timeout(format!(
                    "no response within {:.0}s",
                    self.provider_timeout.as_secs_f64()
                ))
                .into())
            }
        }
    }
}
