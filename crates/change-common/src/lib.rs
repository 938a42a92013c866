//! Common types shared across the land-change crates and services.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod year;

pub use bbox::{BoundingBox, Corner};
pub use error::{ChangeError, ChangeResult, ProviderCategory};
pub use grid::{EmbeddingGrid, GridError, GridSize};
pub use year::{validate_year, YearPair, MAX_YEAR, MIN_YEAR};

/// Number of components per embedding vector in the backing dataset.
pub const EMBEDDING_DIMENSIONS: usize = 64;
