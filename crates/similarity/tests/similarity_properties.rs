//! Property-style tests for similarity scoring over whole grids.

use change_common::{BoundingBox, GridSize};
use similarity::{compute_similarity, SimilarityError, StatisticsState};
use test_utils::{
    assert_approx_eq, assert_scores_normalized, basis_vector, masked_grid, negated_grid,
    random_unit_grid, regions, uniform_grid, zero_grid,
};

const DIMS: usize = 64;

fn small_bounds() -> BoundingBox {
    regions::SMALL
}

#[test]
fn test_output_shape_matches_inputs() {
    for (rows, cols) in [(1, 1), (3, 7), (20, 13), (50, 50)] {
        let size = GridSize::new(rows, cols);
        let a = random_unit_grid(small_bounds(), 2022, size, DIMS, 1);
        let b = random_unit_grid(small_bounds(), 2023, size, DIMS, 2);
        let (grid, _) = compute_similarity(&a, &b).unwrap();
        assert_eq!(grid.rows(), rows);
        assert_eq!(grid.cols(), cols);
        assert_eq!(grid.scores().len(), rows * cols);
        assert_eq!(grid.to_rows().len(), rows);
        assert!(grid.to_rows().iter().all(|r| r.len() == cols));
    }
}

#[test]
fn test_identical_grids_score_one() {
    let size = GridSize::new(10, 10);
    let a = random_unit_grid(small_bounds(), 2022, size, DIMS, 42);
    let (grid, stats) = compute_similarity(&a, &a).unwrap();
    for score in grid.scores() {
        assert_approx_eq!(score.unwrap(), 1.0, 1e-5);
    }
    let stats = stats.available().unwrap();
    assert_approx_eq!(stats.mean, 1.0, 1e-5);
    assert_eq!(stats.missing_cells, 0);
}

#[test]
fn test_opposite_grids_score_zero() {
    let size = GridSize::new(6, 9);
    let a = random_unit_grid(small_bounds(), 2022, size, DIMS, 3);
    let b = negated_grid(&a, 2023);
    let (grid, stats) = compute_similarity(&a, &b).unwrap();
    for score in grid.scores() {
        assert_approx_eq!(score.unwrap(), 0.0, 1e-5);
    }
    assert_approx_eq!(stats.available().unwrap().max, 0.0, 1e-5);
}

#[test]
fn test_orthogonal_vectors_score_half() {
    let size = GridSize::new(2, 2);
    let a = uniform_grid(small_bounds(), 2022, size, &basis_vector(DIMS, 0));
    let b = uniform_grid(small_bounds(), 2023, size, &basis_vector(DIMS, 1));
    let (grid, _) = compute_similarity(&a, &b).unwrap();
    assert!(grid.scores().iter().all(|s| *s == Some(0.5)));
}

#[test]
fn test_scoring_is_symmetric() {
    let size = GridSize::new(8, 8);
    for seed in 0..5u64 {
        let a = random_unit_grid(small_bounds(), 2022, size, DIMS, seed);
        let b = random_unit_grid(small_bounds(), 2023, size, DIMS, seed + 100);
        let (ab, _) = compute_similarity(&a, &b).unwrap();
        let (ba, _) = compute_similarity(&b, &a).unwrap();
        for (x, y) in ab.scores().iter().zip(ba.scores()) {
            assert_approx_eq!(x.unwrap(), y.unwrap(), 1e-6);
        }
        assert_scores_normalized!(ab.scores());
    }
}

#[test]
fn test_all_masked_is_all_missing_not_error() {
    let size = GridSize::new(4, 5);
    let a = zero_grid(small_bounds(), 2022, size, DIMS);
    let b = random_unit_grid(small_bounds(), 2023, size, DIMS, 9);
    let (grid, stats) = compute_similarity(&a, &b).unwrap();
    assert_eq!(grid.missing_count(), 20);
    assert_eq!(stats, StatisticsState::AllMissing { missing_cells: 20 });
    assert_eq!(stats.label(), "all_missing");
}

#[test]
fn test_partially_masked_cells_excluded_from_stats() {
    let size = GridSize::new(3, 3);
    let a = random_unit_grid(small_bounds(), 2022, size, DIMS, 5);
    let b = masked_grid(&a, &[(0, 0), (2, 2)]);
    let (grid, stats) = compute_similarity(&a, &b).unwrap();
    assert_eq!(grid.get(0, 0), Some(None));
    assert_eq!(grid.get(2, 2), Some(None));
    assert!(grid.get(1, 1).unwrap().is_some());
    let stats = stats.available().unwrap();
    assert_eq!(stats.valid_cells, 7);
    assert_eq!(stats.missing_cells, 2);
    assert_approx_eq!(stats.min, 1.0, 1e-5);
}

#[test]
fn test_mismatched_grids_never_truncated() {
    let a = random_unit_grid(small_bounds(), 2022, GridSize::new(10, 10), DIMS, 1);
    let b = random_unit_grid(small_bounds(), 2023, GridSize::new(10, 9), DIMS, 2);
    match compute_similarity(&a, &b) {
        Err(SimilarityError::ShapeMismatch {
            field,
            reference,
            target,
        }) => {
            assert_eq!(field, "cols");
            assert_eq!(reference, "10");
            assert_eq!(target, "9");
        }
        other => panic!("expected shape mismatch, got {:?}", other),
    }
}

#[test]
fn test_statistics_are_consistent() {
    let size = GridSize::new(12, 12);
    let a = random_unit_grid(small_bounds(), 2022, size, DIMS, 11);
    let b = random_unit_grid(small_bounds(), 2023, size, DIMS, 12);
    let (_, stats) = compute_similarity(&a, &b).unwrap();
    let s = stats.available().unwrap();
    assert!(s.min <= s.mean && s.mean <= s.max);
    assert!(s.stddev >= 0.0);
    assert!(s.min >= 0.0 && s.max <= 1.0);
    assert_eq!(s.valid_cells + s.missing_cells, 144);
}
