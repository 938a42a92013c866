//! Pairwise similarity between two years' embedding grids.

use change_common::EmbeddingGrid;
use tracing::{debug, error};

use crate::cosine::normalized_similarity;
use crate::error::{Result, SimilarityError};
use crate::stats::compute_statistics;
use crate::types::{SimilarityGrid, StatisticsState};

/// Edge tolerance when comparing grid bounds, in degrees.
const BOUNDS_TOLERANCE: f64 = 1e-9;

/// Verify that two grids describe exactly the same cells.
///
/// Rows, columns, vector dimensions, cell counts and bounds must all
/// match. Misaligned grids are never truncated or resampled.
pub fn check_alignment(reference: &EmbeddingGrid, target: &EmbeddingGrid) -> Result<()> {
    if reference.rows() != target.rows() {
        return Err(SimilarityError::shape_mismatch(
            "rows",
            reference.rows(),
            target.rows(),
        ));
    }
    if reference.cols() != target.cols() {
        return Err(SimilarityError::shape_mismatch(
            "cols",
            reference.cols(),
            target.cols(),
        ));
    }
    if reference.dimensions() != target.dimensions() {
        return Err(SimilarityError::shape_mismatch(
            "dimensions",
            reference.dimensions(),
            target.dimensions(),
        ));
    }
    if reference.cell_count() != target.cell_count() {
        return Err(SimilarityError::shape_mismatch(
            "cell count",
            reference.cell_count(),
            target.cell_count(),
        ));
    }
    if !reference.bounds().approx_eq(target.bounds(), BOUNDS_TOLERANCE) {
        return Err(SimilarityError::shape_mismatch(
            "bounds",
            format!("{:?}", reference.bounds()),
            format!("{:?}", target.bounds()),
        ));
    }
    Ok(())
}

/// Score every cell of two aligned grids and summarise the result.
///
/// Each cell gets `(cos(a, b) + 1) / 2`. Cells where either vector is
/// degenerate are left missing and excluded from the statistics.
pub fn compute_similarity(
    reference: &EmbeddingGrid,
    target: &EmbeddingGrid,
) -> Result<(SimilarityGrid, StatisticsState)> {
    if let Err(e) = check_alignment(reference, target) {
        error!(
            error = %e,
            reference_year = reference.year(),
            target_year = target.year(),
            "Refusing to score misaligned embedding grids"
        );
        return Err(e);
    }

    let scores: Vec<Option<f32>> = reference
        .vectors()
        .zip(target.vectors())
        .map(|(a, b)| normalized_similarity(a, b).map(|s| s as f32))
        .collect();

    let grid = SimilarityGrid::new(*reference.bounds(), reference.size(), scores);
    let stats = compute_statistics(grid.scores());

    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        missing = grid.missing_count(),
        "Computed similarity grid"
    );

    Ok((grid, stats))
}
