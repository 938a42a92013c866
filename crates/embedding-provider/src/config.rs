//! Provider selection and settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ProviderError, Result};
use crate::http::{HttpArchive, HttpArchiveConfig};
use crate::provider::EmbeddingProvider;
use crate::synthetic::{SyntheticArchive, SyntheticConfig};

/// Which archive implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Synthetic,
    Http,
}

impl ProviderKind {
    /// Parse a known provider name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "synthetic" => Some(Self::Synthetic),
            "http" | "remote" => Some(Self::Http),
            _ => None,
        }
    }

    /// Parse from string. Unknown names fall back to synthetic with a warning.
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!(value = s, "Unknown embedding provider, using synthetic");
            Self::Synthetic
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synthetic => "synthetic",
            Self::Http => "http",
        }
    }
}

/// Configuration for building an embedding provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Archive root URL (required for `http`).
    pub archive_url: Option<String>,

    /// Project forwarded to the archive.
    pub project: Option<String>,

    /// Explicit credentials file.
    pub credentials_path: Option<PathBuf>,

    /// Per-request HTTP timeout.
    pub http_timeout: Duration,

    /// Simulated latency of the synthetic archive.
    pub synthetic_latency: Duration,

    /// Seed of the synthetic archive.
    pub synthetic_seed: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Synthetic,
            archive_url: None,
            project: None,
            credentials_path: None,
            http_timeout: Duration::from_secs(60),
            synthetic_latency: Duration::ZERO,
            synthetic_seed: SyntheticConfig::default().seed,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EMBEDDING_PROVIDER") {
            config.kind = ProviderKind::from_str(&val);
        }

        if let Ok(val) = std::env::var("EMBEDDING_ARCHIVE_URL") {
            if !val.is_empty() {
                config.archive_url = Some(val);
            }
        }

        if let Ok(val) = std::env::var("EMBEDDING_ARCHIVE_PROJECT") {
            if !val.is_empty() {
                config.project = Some(val);
            }
        }

        if let Ok(val) = std::env::var("EMBEDDING_CREDENTIALS_PATH") {
            if !val.is_empty() {
                config.credentials_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("EMBEDDING_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.http_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("SYNTHETIC_LATENCY_MS") {
            if let Ok(ms) = val.parse() {
                config.synthetic_latency = Duration::from_millis(ms);
            }
        }

        if let Ok(val) = std::env::var("SYNTHETIC_SEED") {
            if let Ok(seed) = val.parse() {
                config.synthetic_seed = seed;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.kind == ProviderKind::Http && self.archive_url.is_none() {
            return Err("EMBEDDING_ARCHIVE_URL is required for the http provider".to_string());
        }
        if self.http_timeout.is_zero() {
            return Err("http_timeout must be > 0".to_string());
        }
        Ok(())
    }

    /// Construct the configured provider. It still needs `initialize()`.
    pub fn build(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.validate().map_err(ProviderError::InvalidRequest)?;
        match self.kind {
            ProviderKind::Synthetic => Ok(Arc::new(SyntheticArchive::new(SyntheticConfig {
                seed: self.synthetic_seed,
                latency: self.synthetic_latency,
                ..SyntheticConfig::default()
            }))),
            ProviderKind::Http => {
                let url = self.archive_url.clone().unwrap_or_default();
                let mut http = HttpArchiveConfig::new(url);
                http.project = self.project.clone();
                http.credentials_path = self.credentials_path.clone();
                http.request_timeout = self.http_timeout;
                Ok(Arc::new(HttpArchive::new(http)?))
            }
        }
    }
}
