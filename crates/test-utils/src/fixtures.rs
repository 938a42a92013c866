//! Common test fixtures for land-change tests.
//!
//! Regions here mirror the demo locations served by the API, plus a few
//! deliberately broken boxes for validation tests.

/// Common bounding box definitions for testing.
pub mod regions {
    use change_common::BoundingBox;

    /// California Central Valley, 1° × 1°.
    pub const CENTRAL_VALLEY: BoundingBox = BoundingBox {
        north: 37.0,
        south: 36.0,
        east: -120.5,
        west: -121.5,
    };

    /// Amazon basin deforestation front, 2° × 2°.
    pub const AMAZON: BoundingBox = BoundingBox {
        north: -2.0,
        south: -4.0,
        east: -59.0,
        west: -61.0,
    };

    /// Dubai urban expansion.
    pub const DUBAI: BoundingBox = BoundingBox {
        north: 25.5,
        south: 24.9,
        east: 55.6,
        west: 54.9,
    };

    /// A small box that lands in the finest resolution tier.
    pub const SMALL: BoundingBox = BoundingBox {
        north: 43.7,
        south: 43.6,
        east: -79.3,
        west: -79.4,
    };

    /// Inverted latitudes (north < south).
    pub const INVERTED: BoundingBox = BoundingBox {
        north: 36.0,
        south: 37.0,
        east: -120.5,
        west: -121.5,
    };

    /// Larger than the default area cap.
    pub const CONTINENTAL: BoundingBox = BoundingBox {
        north: 55.0,
        south: 20.0,
        east: -60.0,
        west: -130.0,
    };
}

/// Years used across scenarios.
pub mod years {
    pub const REFERENCE: i32 = 2022;
    pub const TARGET: i32 = 2023;
    /// One year before archive coverage starts.
    pub const BEFORE_COVERAGE: i32 = 2016;
    /// One year after archive coverage ends.
    pub const AFTER_COVERAGE: i32 = 2025;
}
