//! Deterministic procedural embedding archive.
//!
//! Generates plausible-looking embeddings without any remote service.
//! Every location gets a land class from smooth value noise, and the
//! class decides which quarter of the vector dominates:
//!
//! | components | class      |
//! |------------|------------|
//! | 0..16      | water      |
//! | 16..32     | vegetation |
//! | 32..48     | urban      |
//! | 48..64     | barren     |
//!
//! Later years grow seeded "change patches" (urban expansion and
//! vegetation loss), so the same place can drift between years while
//! untouched places keep an identical vector. A share of water cells is
//! masked to the zero vector.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use change_common::{BoundingBox, EmbeddingGrid, GridSize, EMBEDDING_DIMENSIONS, MIN_YEAR};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::provider::{check_request, run_cancellable, EmbeddingProvider};

/// Degrees per land-class noise cell.
const CLASS_SCALE: f64 = 0.08;
/// Degrees per change-patch noise cell.
const PATCH_SCALE: f64 = 0.03;
/// Quantisation of per-location jitter, in degrees.
const JITTER_SCALE: f64 = 1e-3;

const GROUPS: usize = 4;

/// Settings for [`SyntheticArchive`].
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Seed of every noise field.
    pub seed: u64,
    /// Simulated archive latency per fetch.
    pub latency: Duration,
    /// Share of water cells returned as no-data, in `[0, 1]`.
    pub water_mask_fraction: f64,
    /// Vector length.
    pub dimensions: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            latency: Duration::ZERO,
            water_mask_fraction: 0.3,
            dimensions: EMBEDDING_DIMENSIONS,
        }
    }
}

/// Land classes in vector-group order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Water = 0,
    Vegetation = 1,
    Urban = 2,
    Barren = 3,
}

/// In-process embedding archive backed by procedural noise.
pub struct SyntheticArchive {
    config: SyntheticConfig,
    initialized: AtomicBool,
}

impl SyntheticArchive {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            initialized: AtomicBool::new(false),
        }
    }

    /// Embedding vector for one location and year.
    ///
    /// Returns the zero vector for masked cells.
    pub fn embedding_at(&self, lat: f64, lon: f64, year: i32) -> Vec<f32> {
        let seed = self.config.seed;
        let years_since_start = (year - MIN_YEAR).max(0) as f64;

        let mut moisture = value_noise(seed, lat / CLASS_SCALE, lon / CLASS_SCALE);
        let mut development =
            value_noise(seed ^ 0xde7e_10e0, lat / CLASS_SCALE, lon / CLASS_SCALE);

        // Change patches intensify linearly with time
        let growth = value_noise(seed ^ 0x96e0_77e5, lat / PATCH_SCALE, lon / PATCH_SCALE);
        if growth > 0.65 {
            development += 0.06 * years_since_start;
        }
        let clearing = value_noise(seed ^ 0xc1ea_7000, lat / PATCH_SCALE, lon / PATCH_SCALE);
        if clearing > 0.7 {
            moisture -= 0.05 * years_since_start;
        }

        let class = if moisture < 0.28 {
            Class::Water
        } else if development > 0.72 {
            Class::Urban
        } else if moisture > 0.5 {
            Class::Vegetation
        } else {
            Class::Barren
        };

        if class == Class::Water {
            let mask = value_noise(seed ^ 0x3a5c, lat / CLASS_SCALE, lon / CLASS_SCALE);
            if mask < self.config.water_mask_fraction {
                return vec![0.0; self.config.dimensions];
            }
        }

        self.class_vector(class, lat, lon)
    }

    fn class_vector(&self, class: Class, lat: f64, lon: f64) -> Vec<f32> {
        let dims = self.config.dimensions;
        let group_len = (dims / GROUPS).max(1);
        let qlat = (lat / JITTER_SCALE).floor() as i64;
        let qlon = (lon / JITTER_SCALE).floor() as i64;

        let mut v: Vec<f32> = (0..dims)
            .map(|i| {
                let jitter = unit_hash(self.config.seed, qlat, qlon, i as u64) as f32;
                if i / group_len == class as usize {
                    0.8 + 0.2 * jitter
                } else {
                    0.3 * jitter - 0.15
                }
            })
            .collect();

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    fn build_grid(&self, bounds: &BoundingBox, year: i32, size: GridSize) -> Result<EmbeddingGrid> {
        let mut data = Vec::with_capacity(size.cells() * self.config.dimensions);
        for row in 0..size.rows {
            for col in 0..size.cols {
                let (lat, lon) = size.cell_center(bounds, row, col);
                data.extend(self.embedding_at(lat, lon, year));
            }
        }
        EmbeddingGrid::new(*bounds, year, size, self.config.dimensions, data)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

impl Default for SyntheticArchive {
    fn default() -> Self {
        Self::new(SyntheticConfig::default())
    }
}

#[async_trait]
impl EmbeddingProvider for SyntheticArchive {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn initialize(&self) -> Result<()> {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            info!(
                seed = self.config.seed,
                latency_ms = self.config.latency.as_millis() as u64,
                "Synthetic embedding archive ready"
            );
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn fetch_embedding_grid(
        &self,
        bounds: &BoundingBox,
        year: i32,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> Result<EmbeddingGrid> {
        if !self.is_initialized() {
            return Err(ProviderError::NotInitialized);
        }
        check_request(bounds, year, size)?;

        run_cancellable(cancel, async {
            if !self.config.latency.is_zero() {
                tokio::time::sleep(self.config.latency).await;
            }
            let grid = self.build_grid(bounds, year, size)?;
            debug!(year, rows = size.rows, cols = size.cols, "Generated synthetic grid");
            Ok(grid)
        })
        .await
    }
}

/// SplitMix64 finaliser.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Hash of a lattice point to `[0, 1)`.
fn unit_hash(seed: u64, x: i64, y: i64, z: u64) -> f64 {
    let h = mix(seed ^ mix(x as u64 ^ mix(y as u64 ^ mix(z))));
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Smoothly interpolated lattice noise in `[0, 1)`.
fn value_noise(seed: u64, x: f64, y: f64) -> f64 {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (smoothstep(x - x0), smoothstep(y - y0));
    let (ix, iy) = (x0 as i64, y0 as i64);

    let v00 = unit_hash(seed, ix, iy, 0);
    let v10 = unit_hash(seed, ix + 1, iy, 0);
    let v01 = unit_hash(seed, ix, iy + 1, 0);
    let v11 = unit_hash(seed, ix + 1, iy + 1, 0);

    let top = v00 + (v10 - v00) * fx;
    let bottom = v01 + (v11 - v01) * fx;
    top + (bottom - top) * fy
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive() -> SyntheticArchive {
        SyntheticArchive::default()
    }

    #[test]
    fn test_value_noise_range_and_determinism() {
        for i in 0..200 {
            let x = i as f64 * 0.37 - 20.0;
            let y = i as f64 * 0.11 + 5.0;
            let n = value_noise(1, x, y);
            assert!((0.0..1.0).contains(&n));
            assert_eq!(n, value_noise(1, x, y));
        }
    }

    #[test]
    fn test_vectors_unit_or_zero() {
        let a = archive();
        for i in 0..100 {
            let v = a.embedding_at(36.0 + i as f64 * 0.01, -121.0, 2022);
            assert_eq!(v.len(), EMBEDDING_DIMENSIONS);
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-4, "norm {norm}");
        }
    }

    #[test]
    fn test_same_year_is_deterministic() {
        let a = archive();
        assert_eq!(
            a.embedding_at(10.123, 20.456, 2020),
            a.embedding_at(10.123, 20.456, 2020)
        );
    }

    #[test]
    fn test_years_differ_somewhere() {
        let a = archive();
        let changed = (0..400).any(|i| {
            let lat = 36.0 + (i / 20) as f64 * 0.05;
            let lon = -121.5 + (i % 20) as f64 * 0.05;
            a.embedding_at(lat, lon, 2017) != a.embedding_at(lat, lon, 2024)
        });
        assert!(changed);
    }

    #[tokio::test]
    async fn test_fetch_requires_initialize() {
        let a = archive();
        let bounds = BoundingBox::new(37.0, 36.0, -120.5, -121.5);
        let cancel = CancellationToken::new();
        let err = a
            .fetch_embedding_grid(&bounds, 2022, GridSize::new(4, 4), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::NotInitialized);

        a.initialize().await.unwrap();
        let grid = a
            .fetch_embedding_grid(&bounds, 2022, GridSize::new(4, 5), &cancel)
            .await
            .unwrap();
        assert_eq!((grid.rows(), grid.cols()), (4, 5));
        assert_eq!(grid.dimensions(), EMBEDDING_DIMENSIONS);
        assert_eq!(grid.year(), 2022);

        a.shutdown().await;
        assert!(!a.is_initialized());
    }
}
