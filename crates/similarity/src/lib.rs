//! Similarity scoring between embedding grids of two years.
//!
//! This crate turns two aligned [`EmbeddingGrid`]s into a per-cell
//! similarity surface. It covers:
//!
//! - **Scoring**: cosine similarity per cell, mapped onto `[0, 1]`
//! - **Masking**: near-zero vectors become missing cells, never scores
//! - **Statistics**: min/max/mean/stddev over the valid cells
//! - **Resolution policy**: deterministic area → grid size tiers
//! - **Point sampling**: lattice sampling and a naive land-use label
//!
//! # Architecture
//!
//! ```text
//! bounds ──► resolution_policy() ──► GridSize
//!                                      │
//!              provider (×2 years) ◄───┘
//!                     │
//!                     ▼
//! compute_similarity(reference, target)
//!      │
//!      ├─► check alignment (ShapeMismatch if not)
//!      ├─► cosine per cell, (sim + 1) / 2
//!      └─► statistics over valid cells
//!               │
//!               ▼
//!   (SimilarityGrid, StatisticsState) ──► renderer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use similarity::{compute_similarity, StatisticsState};
//!
//! let (grid, stats) = compute_similarity(&reference, &target)?;
//! if let StatisticsState::Available(s) = stats {
//!     println!("mean similarity {:.3}", s.mean);
//! }
//! ```
//!
//! [`EmbeddingGrid`]: change_common::EmbeddingGrid

pub mod classify;
pub mod cosine;
pub mod engine;
pub mod error;
pub mod points;
pub mod policy;
pub mod stats;
pub mod types;

// Re-export commonly used types at crate root
pub use classify::{classify, Classification, LandUse};
pub use cosine::{cosine_similarity, normalized_similarity, NORM_EPSILON};
pub use engine::{check_alignment, compute_similarity};
pub use error::{Result, SimilarityError};
pub use points::{lattice_size, sample_points, SamplePoint};
pub use policy::{resolution_policy, ResolutionPolicy, ResolutionTier};
pub use stats::compute_statistics;
pub use types::{SimilarityGrid, SimilarityStatistics, StatisticsState};
