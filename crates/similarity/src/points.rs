//! Point sampling mode.
//!
//! Instead of a dense heatmap, return embeddings for a handful of
//! locations spread over the box. Samples are the first `n` cell centers
//! (row-major) of a `k × k` lattice with `k = ceil(sqrt(n))`.

use change_common::{EmbeddingGrid, GridSize};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, LandUse};
use crate::cosine::normalized_similarity;
use crate::error::{Result, SimilarityError};

/// One sampled location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// `None` for masked (no-data) cells.
    pub embedding: Option<Vec<f32>>,
    pub land_use: LandUse,
    pub confidence: f32,
    /// Score against the mean embedding of all valid samples.
    pub similarity_to_mean: Option<f32>,
}

/// Lattice to request from the provider for `num_points` samples.
pub fn lattice_size(num_points: usize, max_points: usize) -> Result<GridSize> {
    if num_points == 0 || num_points > max_points {
        return Err(SimilarityError::InvalidPointCount {
            requested: num_points,
            max: max_points,
        });
    }
    let side = (num_points as f64).sqrt().ceil() as usize;
    Ok(GridSize::new(side, side))
}

/// Take the first `num_points` cells of `grid` as samples.
pub fn sample_points(grid: &EmbeddingGrid, num_points: usize) -> Vec<SamplePoint> {
    let cells: Vec<(usize, usize)> = (0..grid.rows())
        .flat_map(|row| (0..grid.cols()).map(move |col| (row, col)))
        .take(num_points)
        .collect();

    let classified: Vec<(usize, usize, Option<&[f32]>)> = cells
        .iter()
        .map(|&(row, col)| {
            let vector = grid
                .vector(row, col)
                .filter(|v| classify(v).land_use != LandUse::NoData);
            (row, col, vector)
        })
        .collect();

    let mean = mean_vector(classified.iter().filter_map(|(_, _, v)| *v), grid.dimensions());

    classified
        .into_iter()
        .map(|(row, col, vector)| {
            let (latitude, longitude) = grid.cell_center(row, col);
            match vector {
                Some(v) => {
                    let label = classify(v);
                    SamplePoint {
                        latitude,
                        longitude,
                        embedding: Some(v.to_vec()),
                        land_use: label.land_use,
                        confidence: label.confidence,
                        similarity_to_mean: mean
                            .as_deref()
                            .and_then(|m| normalized_similarity(v, m))
                            .map(|s| s as f32),
                    }
                }
                None => SamplePoint {
                    latitude,
                    longitude,
                    embedding: None,
                    land_use: LandUse::NoData,
                    confidence: 0.0,
                    similarity_to_mean: None,
                },
            }
        })
        .collect()
}

fn mean_vector<'a>(vectors: impl Iterator<Item = &'a [f32]>, dimensions: usize) -> Option<Vec<f32>> {
    let mut sum = vec![0.0f64; dimensions];
    let mut count = 0usize;
    for v in vectors {
        for (acc, &x) in sum.iter_mut().zip(v) {
            *acc += x as f64;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum.into_iter().map(|s| (s / count as f64) as f32).collect())
}
