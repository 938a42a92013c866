//! Service configuration and demo-location loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use change_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// File name of the demo-location list inside the config directory.
pub const DEMO_LOCATIONS_FILE: &str = "demo_locations.yaml";

/// Runtime settings for the request pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upper bound on the two-year provider fetch.
    pub provider_timeout: Duration,

    /// Boxes above this area are rejected.
    pub max_area_sq_degrees: f64,

    /// Pixel block per grid cell in rendered heatmaps.
    pub pixels_per_cell: usize,

    /// Cap on the longer image side.
    pub max_image_dimension: usize,

    /// Upper limit of `num_points` in sampling mode.
    pub max_points: usize,

    /// Directory holding optional YAML configuration.
    pub config_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(90),
            max_area_sq_degrees: 100.0,
            pixels_per_cell: 8,
            max_image_dimension: 1024,
            max_points: 1000,
            config_dir: PathBuf::from("config"),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.provider_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("MAX_AREA_SQ_DEGREES") {
            if let Ok(area) = val.parse() {
                config.max_area_sq_degrees = area;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_PIXELS_PER_CELL") {
            if let Ok(px) = val.parse() {
                config.pixels_per_cell = px;
            }
        }

        if let Ok(val) = std::env::var("MAX_POINTS") {
            if let Ok(max) = val.parse() {
                config.max_points = max;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_timeout.is_zero() {
            return Err("provider_timeout must be > 0".to_string());
        }
        if !(self.max_area_sq_degrees > 0.0) {
            return Err("max_area_sq_degrees must be > 0".to_string());
        }
        if self.pixels_per_cell == 0 {
            return Err("pixels_per_cell must be > 0".to_string());
        }
        if self.max_points == 0 {
            return Err("max_points must be > 0".to_string());
        }
        Ok(())
    }
}

/// A predefined region offered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bounds: BoundingBox,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct DemoLocationsFile {
    locations: Vec<DemoLocation>,
}

/// Load demo locations from `{dir}/demo_locations.yaml`.
///
/// A missing file yields the built-in list. A present but malformed file
/// is an error.
pub fn load_demo_locations(dir: &Path) -> Result<Vec<DemoLocation>> {
    let path = dir.join(DEMO_LOCATIONS_FILE);
    if !path.exists() {
        tracing::info!(path = %path.display(), "No demo location file, using defaults");
        return Ok(default_demo_locations());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read: {:?}", path))?;
    let file: DemoLocationsFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse demo locations: {:?}", path))?;

    for loc in &file.locations {
        loc.bounds
            .validate()
            .with_context(|| format!("Invalid bounds for demo location '{}'", loc.name))?;
    }

    tracing::info!(count = file.locations.len(), path = %path.display(), "Loaded demo locations");
    Ok(file.locations)
}

/// Built-in demo regions.
pub fn default_demo_locations() -> Vec<DemoLocation> {
    let loc = |name: &str, lat, lon, bounds, description: &str| DemoLocation {
        name: name.to_string(),
        latitude: lat,
        longitude: lon,
        bounds,
        description: description.to_string(),
    };
    vec![
        loc(
            "Amazon Rainforest",
            -3.0,
            -60.0,
            BoundingBox::new(-2.0, -4.0, -59.0, -61.0),
            "Deforestation monitoring in the Amazon Basin",
        ),
        loc(
            "California Central Valley",
            36.5,
            -121.0,
            BoundingBox::new(37.0, 36.0, -120.5, -121.5),
            "Agricultural expansion and water usage patterns",
        ),
        loc(
            "Dubai Urban Development",
            25.2048,
            55.2708,
            BoundingBox::new(25.5, 24.9, 55.6, 54.9),
            "Rapid urban expansion in the desert",
        ),
        loc(
            "Greenland Ice Sheet",
            72.0,
            -42.0,
            BoundingBox::new(72.5, 71.5, -41.5, -42.5),
            "Glacial retreat and climate change impacts",
        ),
    ]
}
