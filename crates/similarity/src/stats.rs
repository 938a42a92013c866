//! Summary statistics over similarity scores.

use crate::types::{SimilarityStatistics, StatisticsState};

/// Compute min, max, mean and population stddev over the finite scores.
///
/// Missing cells (and any non-finite value) are skipped. If nothing is
/// left, the result is [`StatisticsState::AllMissing`] rather than zeros.
pub fn compute_statistics(scores: &[Option<f32>]) -> StatisticsState {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in scores.iter().flatten().map(|&v| v as f64) {
        if !value.is_finite() {
            continue;
        }
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    let missing_cells = scores.len() - count;
    if count == 0 {
        return StatisticsState::AllMissing { missing_cells };
    }

    let mean = sum / count as f64;
    let variance = scores
        .iter()
        .flatten()
        .map(|&v| v as f64)
        .filter(|v| v.is_finite())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;

    StatisticsState::Available(SimilarityStatistics {
        min,
        max,
        // Keep mean inside [min, max] despite summation error
        mean: mean.clamp(min, max),
        stddev: variance.sqrt(),
        valid_cells: count,
        missing_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let scores = [Some(0.2), Some(0.4), Some(0.6), Some(0.8), None];
        let stats = *compute_statistics(&scores).available().unwrap();
        assert!((stats.min - 0.2).abs() < 1e-6);
        assert!((stats.max - 0.8).abs() < 1e-6);
        assert!((stats.mean - 0.5).abs() < 1e-6);
        // population stddev of 0.2,0.4,0.6,0.8
        assert!((stats.stddev - 0.05f64.sqrt()).abs() < 1e-6);
        assert_eq!(stats.valid_cells, 4);
        assert_eq!(stats.missing_cells, 1);
    }

    #[test]
    fn test_all_missing_is_distinct() {
        let state = compute_statistics(&[None, None, None]);
        assert_eq!(state, StatisticsState::AllMissing { missing_cells: 3 });
        assert!(state.available().is_none());
        assert_eq!(state.label(), "all_missing");
    }

    #[test]
    fn test_empty_input_is_all_missing() {
        assert_eq!(
            compute_statistics(&[]),
            StatisticsState::AllMissing { missing_cells: 0 }
        );
    }

    #[test]
    fn test_nan_scores_skipped() {
        let stats = *compute_statistics(&[Some(f32::NAN), Some(0.5)])
            .available()
            .unwrap();
        assert_eq!(stats.valid_cells, 1);
        assert_eq!(stats.missing_cells, 1);
        assert_eq!(stats.mean, 0.5);
    }
}
