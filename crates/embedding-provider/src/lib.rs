//! Access to annual satellite embedding grids.
//!
//! The [`EmbeddingProvider`] trait is the only seam between the request
//! pipeline and the archive. Two implementations ship here:
//!
//! - [`SyntheticArchive`]: deterministic procedural embeddings, no network
//! - [`HttpArchive`]: a `reqwest` client for a remote archive with
//!   credential discovery
//!
//! Failures carry a [`ProviderCategory`] (AUTH, TIMEOUT, QUOTA, UNKNOWN)
//! so callers can tell configuration problems from transient ones.

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod synthetic;

pub use change_common::ProviderCategory;
pub use config::{ProviderConfig, ProviderKind};
pub use error::{ProviderError, Result};
pub use http::{credential_candidates, discover_credentials, Credentials, HttpArchive, HttpArchiveConfig};
pub use provider::{check_request, run_cancellable, EmbeddingProvider};
pub use synthetic::{SyntheticArchive, SyntheticConfig};
