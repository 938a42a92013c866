//! Area → grid resolution policy.
//!
//! Larger boxes get coarser grids so that provider latency and scoring
//! cost stay bounded. The mapping is a pure function of the bounds.

use change_common::{BoundingBox, GridSize};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimilarityError};

/// One tier: boxes up to `max_area_sq_degrees` get `cells` along their long side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTier {
    pub max_area_sq_degrees: f64,
    pub cells: usize,
}

/// Configuration of the resolution policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPolicy {
    /// Tiers in ascending order of area.
    pub tiers: Vec<ResolutionTier>,

    /// Cells along the long side for boxes larger than every tier.
    pub fallback_cells: usize,

    /// Boxes above this area are rejected outright.
    pub max_area_sq_degrees: f64,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                ResolutionTier {
                    max_area_sq_degrees: 0.25,
                    cells: 100,
                },
                ResolutionTier {
                    max_area_sq_degrees: 1.0,
                    cells: 50,
                },
                ResolutionTier {
                    max_area_sq_degrees: 4.0,
                    cells: 30,
                },
            ],
            fallback_cells: 20,
            max_area_sq_degrees: 100.0,
        }
    }
}

impl ResolutionPolicy {
    /// Default tiers with a different area cap.
    pub fn with_max_area(max_area_sq_degrees: f64) -> Self {
        Self {
            max_area_sq_degrees,
            ..Self::default()
        }
    }

    /// Cells along the long side for a box of the given area.
    pub fn cells_for_area(&self, area_sq_degrees: f64) -> usize {
        self.tiers
            .iter()
            .find(|tier| area_sq_degrees <= tier.max_area_sq_degrees)
            .map(|tier| tier.cells)
            .unwrap_or(self.fallback_cells)
    }

    /// Grid size for `bounds`.
    ///
    /// The tier count applies to the longer side; the shorter side is
    /// scaled by the aspect ratio and rounded, with at least one cell.
    pub fn grid_size(&self, bounds: &BoundingBox) -> Result<GridSize> {
        let area = bounds.area_sq_degrees();
        if area > self.max_area_sq_degrees {
            return Err(SimilarityError::AreaTooLarge {
                area,
                limit: self.max_area_sq_degrees,
            });
        }

        let long_cells = self.cells_for_area(area);
        let (width, height) = (bounds.width(), bounds.height());
        let short_cells = |short: f64, long: f64| {
            ((long_cells as f64 * short / long).round() as usize).clamp(1, long_cells)
        };

        let size = if width >= height {
            GridSize::new(short_cells(height, width), long_cells)
        } else {
            GridSize::new(long_cells, short_cells(width, height))
        };
        Ok(size)
    }
}

/// Grid size for `bounds` under the default policy.
pub fn resolution_policy(bounds: &BoundingBox) -> Result<GridSize> {
    ResolutionPolicy::default().grid_size(bounds)
}
