//! Core types for similarity results.

use change_common::{BoundingBox, GridSize};
use serde::{Deserialize, Serialize};

/// Per-cell similarity scores for two aligned embedding grids.
///
/// Scores lie in `[0, 1]` (1 = same direction, 0 = opposite). `None`
/// marks a missing cell where either vector was degenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityGrid {
    bounds: BoundingBox,
    size: GridSize,
    scores: Vec<Option<f32>>,
}

impl SimilarityGrid {
    pub(crate) fn new(bounds: BoundingBox, size: GridSize, scores: Vec<Option<f32>>) -> Self {
        debug_assert_eq!(scores.len(), size.cells());
        Self {
            bounds,
            size,
            scores,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn cols(&self) -> usize {
        self.size.cols
    }

    /// `(lat_step, lon_step)` in degrees.
    pub fn resolution(&self) -> (f64, f64) {
        self.size.steps(&self.bounds)
    }

    /// Score at `(row, col)`. Outer `None` means out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Option<f32>> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }
        self.scores.get(row * self.size.cols + col).copied()
    }

    /// All scores in row-major order.
    pub fn scores(&self) -> &[Option<f32>] {
        &self.scores
    }

    /// Scores as nested rows, the shape used in JSON responses.
    pub fn to_rows(&self) -> Vec<Vec<Option<f32>>> {
        self.scores
            .chunks(self.size.cols.max(1))
            .map(|row| row.to_vec())
            .collect()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.scores.iter().filter(|s| s.is_none()).count()
    }
}

/// Summary statistics over the valid cells of a similarity grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    pub valid_cells: usize,
    pub missing_cells: usize,
}

/// Whether statistics could be computed.
///
/// `AllMissing` is a valid, empty result, distinct from any error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatisticsState {
    Available(SimilarityStatistics),
    AllMissing { missing_cells: usize },
}

impl StatisticsState {
    /// The statistics, if any cell was valid.
    pub fn available(&self) -> Option<&SimilarityStatistics> {
        match self {
            StatisticsState::Available(stats) => Some(stats),
            StatisticsState::AllMissing { .. } => None,
        }
    }

    /// Label used in responses.
    pub fn label(&self) -> &'static str {
        match self {
            StatisticsState::Available(_) => "available",
            StatisticsState::AllMissing { .. } => "all_missing",
        }
    }
}
