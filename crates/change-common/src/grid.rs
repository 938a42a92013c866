//! Regular lat/lon embedding grids.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Number of rows and columns of a regular grid over a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl GridSize {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Latitude and longitude step sizes for this grid over `bounds`.
    pub fn steps(&self, bounds: &BoundingBox) -> (f64, f64) {
        (
            bounds.height() / self.rows.max(1) as f64,
            bounds.width() / self.cols.max(1) as f64,
        )
    }

    /// Center of cell `(row, col)` as `(lat, lon)`.
    ///
    /// Row 0 is the northern edge, column 0 the western edge.
    pub fn cell_center(&self, bounds: &BoundingBox, row: usize, col: usize) -> (f64, f64) {
        let (lat_step, lon_step) = self.steps(bounds);
        (
            bounds.north - (row as f64 + 0.5) * lat_step,
            bounds.west + (col as f64 + 0.5) * lon_step,
        )
    }
}

/// A grid of embedding vectors for one year over one bounding box.
///
/// Vectors are stored row-major in a single flat buffer of
/// `rows * cols * dimensions` components.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingGrid {
    bounds: BoundingBox,
    year: i32,
    size: GridSize,
    dimensions: usize,
    data: Vec<f32>,
}

impl EmbeddingGrid {
    /// Create a grid, checking that `data` holds exactly one vector per cell.
    pub fn new(
        bounds: BoundingBox,
        year: i32,
        size: GridSize,
        dimensions: usize,
        data: Vec<f32>,
    ) -> Result<Self, GridError> {
        if size.rows == 0 || size.cols == 0 {
            return Err(GridError::Empty);
        }
        if dimensions == 0 {
            return Err(GridError::ZeroDimensions);
        }
        let expected = size.cells() * dimensions;
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            bounds,
            year,
            size,
            dimensions,
            data,
        })
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn year(&self) -> i32 {
        self.year
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

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// `(lat_step, lon_step)` in degrees.
    pub fn resolution(&self) -> (f64, f64) {
        self.size.steps(&self.bounds)
    }

    /// Number of cells (vectors) in the grid.
    pub fn cell_count(&self) -> usize {
        self.data.len() / self.dimensions
    }

    /// The embedding vector at `(row, col)`.
    pub fn vector(&self, row: usize, col: usize) -> Option<&[f32]> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }
        let start = (row * self.size.cols + col) * self.dimensions;
        self.data.get(start..start + self.dimensions)
    }

    /// Iterate over all vectors in row-major order.
    pub fn vectors(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dimensions)
    }

    /// Center of cell `(row, col)` as `(lat, lon)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.size.cell_center(&self.bounds, row, col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid must have at least one row and one column")]
    Empty,

    #[error("Embedding dimension must be non-zero")]
    ZeroDimensions,

    #[error("Grid data has {actual} components, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
