//! Temporal coverage of the embedding archive.

use serde::{Deserialize, Serialize};

/// First year with annual embeddings in the archive.
pub const MIN_YEAR: i32 = 2017;

/// Last year with annual embeddings in the archive.
pub const MAX_YEAR: i32 = 2024;

/// Check that a year falls inside the archive's coverage.
///
/// Out-of-range years are rejected, never clamped.
pub fn validate_year(year: i32) -> Result<i32, YearError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(YearError::OutOfRange(year))
    }
}

/// The two years being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPair {
    pub reference: i32,
    pub target: i32,
}

impl YearPair {
    /// Build a pair, validating both years.
    pub fn new(reference: i32, target: i32) -> Result<Self, YearError> {
        Ok(Self {
            reference: validate_year(reference)?,
            target: validate_year(target)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YearError {
    #[error("Year {0} is outside the supported range {MIN_YEAR}-{MAX_YEAR}")]
    OutOfRange(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_bounds_inclusive() {
        assert!(validate_year(2017).is_ok());
        assert!(validate_year(2024).is_ok());
        assert_eq!(validate_year(2016), Err(YearError::OutOfRange(2016)));
        assert_eq!(validate_year(2025), Err(YearError::OutOfRange(2025)));
    }

    #[test]
    fn test_pair_rejects_either_year() {
        assert!(YearPair::new(2016, 2023).is_err());
        assert!(YearPair::new(2022, 2030).is_err());
        assert_eq!(
            YearPair::new(2022, 2023).unwrap(),
            YearPair {
                reference: 2022,
                target: 2023
            }
        );
    }
}
