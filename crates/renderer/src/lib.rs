//! Image rendering for similarity heatmaps.
//!
//! - Magma color ramp with exact anchor colors
//! - Cell-block rasterisation with transparent no-data cells
//! - PNG encoding (indexed when possible, RGBA otherwise)

pub mod error;
pub mod gradient;
pub mod heatmap;
pub mod png;

pub use error::{RenderError, Result};
pub use gradient::{Color, ColorRamp, ColorStop, MAGMA_HEX};
pub use heatmap::{render_heatmap, HeatmapOptions, RenderedHeatmap};
pub use png::{encode_png, PngEncoding};
