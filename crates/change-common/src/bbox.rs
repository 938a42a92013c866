//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 degrees.
///
/// Boxes never wrap the antimeridian: a valid box always has
/// `north > south` and `east > west`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// A `[lat, lon]` pair as serialized in responses.
pub type Corner = [f64; 2];

impl BoundingBox {
    /// Create a new bounding box. No validation is performed; see [`BoundingBox::validate`].
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Check the box invariants.
    pub fn validate(&self) -> Result<(), BboxError> {
        let values = [self.north, self.south, self.east, self.west];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BboxError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.north) || !(-90.0..=90.0).contains(&self.south) {
            return Err(BboxError::LatitudeOutOfRange {
                north: self.north,
                south: self.south,
            });
        }
        if !(-180.0..=180.0).contains(&self.east) || !(-180.0..=180.0).contains(&self.west) {
            return Err(BboxError::LongitudeOutOfRange {
                east: self.east,
                west: self.west,
            });
        }
        if self.north <= self.south {
            return Err(BboxError::Inverted(format!(
                "north ({}) must be greater than south ({})",
                self.north, self.south
            )));
        }
        if self.east <= self.west {
            return Err(BboxError::Inverted(format!(
                "east ({}) must be greater than west ({})",
                self.east, self.west
            )));
        }
        Ok(())
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Area in square degrees (no latitude correction).
    pub fn area_sq_degrees(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }

    /// Corner coordinates in the fixed order NW, NE, SE, SW, each `[lat, lon]`.
    ///
    /// This is the order used to geo-anchor rendered heatmaps.
    pub fn corners(&self) -> [Corner; 4] {
        [
            [self.north, self.west],
            [self.north, self.east],
            [self.south, self.east],
            [self.south, self.west],
        ]
    }

    /// Whether two boxes describe the same region, within `tolerance` degrees per edge.
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.north - other.north).abs() <= tolerance
            && (self.south - other.south).abs() <= tolerance
            && (self.east - other.east).abs() <= tolerance
            && (self.west - other.west).abs() <= tolerance
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxError {
    #[error("Bounds must be finite numbers")]
    NotFinite,

    #[error("Latitudes must be within [-90, 90], got north={north}, south={south}")]
    LatitudeOutOfRange { north: f64, south: f64 },

    #[error("Longitudes must be within [-180, 180], got east={east}, west={west}")]
    LongitudeOutOfRange { east: f64, west: f64 },

    #[error("Invalid bounds: {0}")]
    Inverted(String),
}
