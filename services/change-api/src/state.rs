//! Application state shared by all handlers.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use embedding_provider::{EmbeddingProvider, ProviderConfig};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::{load_demo_locations, DemoLocation, ServiceConfig};
use crate::pipeline::Pipeline;
use crate::sessions::SessionRegistry;

/// Shared application state.
pub struct AppState {
    /// Embedding archive used by every request.
    pub provider: Arc<dyn EmbeddingProvider>,

    pub pipeline: Pipeline,

    /// In-flight requests keyed by session id.
    pub sessions: Arc<SessionRegistry>,

    pub config: ServiceConfig,

    pub demo_locations: Vec<DemoLocation>,

    /// Prometheus renderer, when a recorder was installed.
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        config: ServiceConfig,
        demo_locations: Vec<DemoLocation>,
    ) -> Self {
        let pipeline = Pipeline::new(Arc::clone(&provider), &config);
        Self {
            provider,
            pipeline,
            sessions: Arc::new(SessionRegistry::new()),
            config,
            demo_locations,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build state from environment configuration.
    ///
    /// The provider is constructed but not initialized; see `main`.
    pub fn from_env(provider_config: &ProviderConfig, config: ServiceConfig) -> Result<Self> {
        config.validate().map_err(|e| anyhow!("Invalid service config: {}", e))?;
        provider_config
            .validate()
            .map_err(|e| anyhow!("Invalid provider config: {}", e))?;

        let provider = provider_config
            .build()
            .context("Failed to construct embedding provider")?;
        let demo_locations = load_demo_locations(&config.config_dir)?;

        tracing::info!(
            provider = provider.name(),
            demo_locations = demo_locations.len(),
            max_area_sq_degrees = config.max_area_sq_degrees,
            "Application state ready"
        );

        Ok(Self::new(provider, config, demo_locations))
    }
}
