//! Naive land-use labelling of single embedding vectors.
//!
//! The vector is split into four equal component groups, read in order
//! as water, vegetation, urban and barren. The group holding the most
//! positive mass wins. This is a coarse bucket for point sampling, not
//! a trained classifier.

use serde::{Deserialize, Serialize};

use crate::cosine::NORM_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    Water,
    Vegetation,
    Urban,
    Barren,
    NoData,
}

impl LandUse {
    /// Classes in component-group order.
    pub const GROUPS: [LandUse; 4] = [
        LandUse::Water,
        LandUse::Vegetation,
        LandUse::Urban,
        LandUse::Barren,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandUse::Water => "water",
            LandUse::Vegetation => "vegetation",
            LandUse::Urban => "urban",
            LandUse::Barren => "barren",
            LandUse::NoData => "no_data",
        }
    }
}

/// A land-use label with the winning group's share of positive mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub land_use: LandUse,
    pub confidence: f32,
}

impl Classification {
    fn no_data() -> Self {
        Self {
            land_use: LandUse::NoData,
            confidence: 0.0,
        }
    }
}

/// Label one embedding vector.
pub fn classify(vector: &[f32]) -> Classification {
    let group_len = vector.len() / LandUse::GROUPS.len();
    if group_len == 0 {
        return Classification::no_data();
    }

    let norm = vector
        .iter()
        .map(|&v| (v as f64).powi(2))
        .sum::<f64>()
        .sqrt();
    if !norm.is_finite() || norm < NORM_EPSILON {
        return Classification::no_data();
    }

    let masses: Vec<f64> = vector
        .chunks(group_len)
        .take(LandUse::GROUPS.len())
        .map(|group| group.iter().map(|&v| (v as f64).max(0.0)).sum())
        .collect();
    let total: f64 = masses.iter().sum();
    if total <= 0.0 {
        return Classification::no_data();
    }

    let (best, mass) = masses
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, &m)| {
            if m > acc.1 {
                (i, m)
            } else {
                acc
            }
        });

    Classification {
        land_use: LandUse::GROUPS[best],
        confidence: (mass / total) as f32,
    }
}
