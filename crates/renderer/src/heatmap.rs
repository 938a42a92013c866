//! Similarity grid → geo-anchored PNG.

use change_common::{BoundingBox, Corner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::gradient::{render_grid, ColorRamp};
use crate::png::{encode_png, PngEncoding};

/// Heatmap output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapOptions {
    /// Edge length in pixels of the square block drawn for each cell.
    pub pixels_per_cell: usize,
    /// Upper bound on the longer image side; the block size shrinks to fit.
    pub max_dimension: usize,
    pub ramp: ColorRamp,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            pixels_per_cell: 8,
            max_dimension: 1024,
            ramp: ColorRamp::magma(),
        }
    }
}

impl HeatmapOptions {
    /// Block size actually used for a `rows × cols` grid. Never below 1.
    pub fn block_size(&self, rows: usize, cols: usize) -> usize {
        let longest = rows.max(cols).max(1);
        let fit = self.max_dimension / longest;
        self.pixels_per_cell.min(fit).max(1)
    }
}

/// An encoded heatmap with its placement on the map.
#[derive(Debug, Clone)]
pub struct RenderedHeatmap {
    pub png: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Image corners as `[NW, NE, SE, SW]`.
    pub corners: [Corner; 4],
    pub encoding: PngEncoding,
}

/// Render row-major `scores` of a `rows × cols` grid over `bounds`.
///
/// Row 0 is drawn at the top (north). Missing cells are fully transparent.
pub fn render_heatmap(
    scores: &[Option<f32>],
    rows: usize,
    cols: usize,
    bounds: &BoundingBox,
    options: &HeatmapOptions,
) -> Result<RenderedHeatmap> {
    if rows == 0 || cols == 0 {
        return Err(RenderError::EmptyGrid { rows, cols });
    }
    if scores.len() != rows * cols {
        return Err(RenderError::ScoreCount {
            expected: rows * cols,
            actual: scores.len(),
        });
    }

    let cells = render_grid(scores, cols, rows, &options.ramp);
    let block = options.block_size(rows, cols);
    let (width, height) = (cols * block, rows * block);
    let pixels = upscale(&cells, cols, rows, block);

    let (png, encoding) = encode_png(&pixels, width, height)?;
    debug!(width, height, block, bytes = png.len(), ?encoding, "Rendered heatmap");

    Ok(RenderedHeatmap {
        png,
        width,
        height,
        corners: bounds.corners(),
        encoding,
    })
}

/// Nearest-neighbour enlargement: each pixel becomes a `block × block` square.
fn upscale(pixels: &[u8], width: usize, height: usize, block: usize) -> Vec<u8> {
    if block == 1 {
        return pixels.to_vec();
    }
    let out_width = width * block;
    let mut out = Vec::with_capacity(out_width * height * block * 4);
    let mut line = Vec::with_capacity(out_width * 4);

    for row in pixels.chunks_exact(width * 4) {
        line.clear();
        for px in row.chunks_exact(4) {
            for _ in 0..block {
                line.extend_from_slice(px);
            }
        }
        for _ in 0..block {
            out.extend_from_slice(&line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_capped() {
        let options = HeatmapOptions::default();
        assert_eq!(options.block_size(50, 50), 8);
        assert_eq!(options.block_size(100, 100), 8);
        assert_eq!(options.block_size(200, 20), 5);
        assert_eq!(options.block_size(5000, 1), 1);
    }

    #[test]
    fn test_upscale() {
        // 2x1 image: red, blue
        let pixels = [255, 0, 0, 255, 0, 0, 255, 255];
        let out = upscale(&pixels, 2, 1, 2);
        assert_eq!(out.len(), 4 * 2 * 4);
        // second row equals first
        assert_eq!(&out[..16], &out[16..]);
        assert_eq!(&out[4..8], &[255, 0, 0, 255]);
        assert_eq!(&out[8..12], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_score_count_checked() {
        let bounds = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
        let err = render_heatmap(&[Some(0.5)], 2, 2, &bounds, &HeatmapOptions::default());
        assert_eq!(
            err.unwrap_err(),
            RenderError::ScoreCount {
                expected: 4,
                actual: 1
            }
        );
    }
}
