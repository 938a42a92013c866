//! Test data generators for creating synthetic embedding grids.
//!
//! These generators create predictable, verifiable grids so that the
//! expected similarity of every cell is known in advance.

use change_common::{BoundingBox, EmbeddingGrid, GridSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a grid by calling `f(row, col)` for every cell.
///
/// # Panics
///
/// Panics if `f` returns a vector whose length differs from `dimensions`.
pub fn grid_from_fn<F>(
    bounds: BoundingBox,
    year: i32,
    size: GridSize,
    dimensions: usize,
    mut f: F,
) -> EmbeddingGrid
where
    F: FnMut(usize, usize) -> Vec<f32>,
{
    let mut data = Vec::with_capacity(size.cells() * dimensions);
    for row in 0..size.rows {
        for col in 0..size.cols {
            let v = f(row, col);
            assert_eq!(v.len(), dimensions, "generator returned wrong length");
            data.extend_from_slice(&v);
        }
    }
    EmbeddingGrid::new(bounds, year, size, dimensions, data).expect("valid test grid")
}

/// Every cell holds the same vector.
pub fn uniform_grid(
    bounds: BoundingBox,
    year: i32,
    size: GridSize,
    vector: &[f32],
) -> EmbeddingGrid {
    grid_from_fn(bounds, year, size, vector.len(), |_, _| vector.to_vec())
}

/// Every cell is the zero vector (fully masked).
pub fn zero_grid(bounds: BoundingBox, year: i32, size: GridSize, dimensions: usize) -> EmbeddingGrid {
    uniform_grid(bounds, year, size, &vec![0.0; dimensions])
}

/// Seeded random unit vectors. The same seed always yields the same grid.
pub fn random_unit_grid(
    bounds: BoundingBox,
    year: i32,
    size: GridSize,
    dimensions: usize,
    seed: u64,
) -> EmbeddingGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    grid_from_fn(bounds, year, size, dimensions, |_, _| {
        random_unit_vector(&mut rng, dimensions)
    })
}

/// A copy of `grid` with every component negated and the year replaced.
pub fn negated_grid(grid: &EmbeddingGrid, year: i32) -> EmbeddingGrid {
    let data: Vec<f32> = grid.vectors().flatten().map(|v| -v).collect();
    EmbeddingGrid::new(*grid.bounds(), year, grid.size(), grid.dimensions(), data)
        .expect("negated grid keeps shape")
}

/// A copy of `grid` with the listed cells zeroed out.
pub fn masked_grid(grid: &EmbeddingGrid, masked: &[(usize, usize)]) -> EmbeddingGrid {
    grid_from_fn(
        *grid.bounds(),
        grid.year(),
        grid.size(),
        grid.dimensions(),
        |row, col| {
            if masked.contains(&(row, col)) {
                vec![0.0; grid.dimensions()]
            } else {
                grid.vector(row, col).map(<[f32]>::to_vec).unwrap_or_default()
            }
        },
    )
}

/// A random vector of unit length.
pub fn random_unit_vector<R: Rng>(rng: &mut R, dimensions: usize) -> Vec<f32> {
    loop {
        let v: Vec<f32> = (0..dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-3 {
            return v.into_iter().map(|x| x / norm).collect();
        }
    }
}

/// Unit vector along axis `i`.
pub fn basis_vector(dimensions: usize, i: usize) -> Vec<f32> {
    let mut v = vec![0.0; dimensions];
    v[i] = 1.0;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> BoundingBox {
        BoundingBox::new(1.0, 0.0, 1.0, 0.0)
    }

    #[test]
    fn test_random_grid_is_deterministic() {
        let a = random_unit_grid(bounds(), 2022, GridSize::new(3, 4), 16, 7);
        let b = random_unit_grid(bounds(), 2022, GridSize::new(3, 4), 16, 7);
        let c = random_unit_grid(bounds(), 2022, GridSize::new(3, 4), 16, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_vectors_are_unit_length() {
        let grid = random_unit_grid(bounds(), 2022, GridSize::new(2, 2), 64, 1);
        for v in grid.vectors() {
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_negated_grid() {
        let grid = uniform_grid(bounds(), 2022, GridSize::new(1, 2), &[1.0, -2.0]);
        let neg = negated_grid(&grid, 2023);
        assert_eq!(neg.year(), 2023);
        assert_eq!(neg.vector(0, 1), Some(&[-1.0f32, 2.0][..]));
    }

    #[test]
    fn test_masked_grid() {
        let grid = uniform_grid(bounds(), 2022, GridSize::new(2, 2), &[1.0, 1.0]);
        let masked = masked_grid(&grid, &[(1, 0)]);
        assert_eq!(masked.vector(1, 0), Some(&[0.0f32, 0.0][..]));
        assert_eq!(masked.vector(0, 0), Some(&[1.0f32, 1.0][..]));
    }
}
