//! Rendering errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("cannot render an empty {rows}x{cols} grid")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("expected {expected} scores for the grid, got {actual}")]
    ScoreCount { expected: usize, actual: usize },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBuffer { expected: usize, actual: usize },

    #[error("PNG compression failed: {0}")]
    Compression(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
