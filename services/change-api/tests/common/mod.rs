//! Scripted embedding provider for service tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use change_common::{BoundingBox, EmbeddingGrid, GridSize, EMBEDDING_DIMENSIONS};
use embedding_provider::{check_request, run_cancellable, EmbeddingProvider, ProviderError, Result};
use tokio_util::sync::CancellationToken;

/// What `fetch_embedding_grid` does once the request passes its checks.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Seeded random unit vectors, different per year.
    Random,
    /// Every cell is the zero vector.
    Masked,
    /// Never answers; only cancellation ends the fetch.
    Stall,
    /// Fail with the given error.
    Fail(ProviderError),
    /// Return one column too few for `target_year`.
    Misaligned { target_year: i32 },
}

/// What `initialize` does.
#[derive(Debug, Clone)]
pub enum InitBehavior {
    Ready,
    Fail(ProviderError),
    /// Succeed after sleeping.
    Delay(Duration),
    /// Never resolve.
    Stall,
}

pub struct TestProvider {
    behavior: Behavior,
    init: InitBehavior,
    initialized: AtomicBool,
    calls: AtomicUsize,
    init_calls: AtomicUsize,
}

impl TestProvider {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            init: InitBehavior::Ready,
            initialized: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose `initialize` always fails with `err`.
    pub fn failing_init(err: ProviderError) -> Self {
        Self::with_init(Behavior::Random, InitBehavior::Fail(err))
    }

    pub fn with_init(behavior: Behavior, init: InitBehavior) -> Self {
        Self {
            init,
            ..Self::new(behavior)
        }
    }

    pub fn shared(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self::new(behavior))
    }

    /// Number of `fetch_embedding_grid` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `initialize` calls so far.
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for TestProvider {
    fn name(&self) -> &str {
        "test"
    }

    async fn initialize(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match &self.init {
            InitBehavior::Ready => {}
            InitBehavior::Fail(err) => return Err(err.clone()),
            InitBehavior::Delay(delay) => tokio::time::sleep(*delay).await,
            InitBehavior::Stall => std::future::pending::<()>().await,
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn fetch_embedding_grid(
        &self,
        bounds: &BoundingBox,
        year: i32,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> Result<EmbeddingGrid> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_initialized() {
            return Err(ProviderError::NotInitialized);
        }
        check_request(bounds, year, size)?;

        match &self.behavior {
            Behavior::Random => Ok(test_utils::random_unit_grid(
                *bounds,
                year,
                size,
                EMBEDDING_DIMENSIONS,
                year as u64,
            )),
            Behavior::Masked => Ok(test_utils::zero_grid(
                *bounds,
                year,
                size,
                EMBEDDING_DIMENSIONS,
            )),
            Behavior::Stall => {
                run_cancellable(cancel, std::future::pending::<Result<EmbeddingGrid>>()).await
            }
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Misaligned { target_year } => {
                let cols = if year == *target_year {
                    size.cols.saturating_sub(1).max(1)
                } else {
                    size.cols
                };
                Ok(test_utils::random_unit_grid(
                    *bounds,
                    year,
                    GridSize::new(size.rows, cols),
                    EMBEDDING_DIMENSIONS,
                    7,
                ))
            }
        }
    }
}

/// Wait until `provider` has started at least `n` initializations.
pub async fn wait_for_init_calls(provider: &TestProvider, n: usize) {
    while provider.init_calls() < n {
        tokio::task::yield_now().await;
    }
}

/// Wait until `provider` has seen at least `n` fetches.
pub async fn wait_for_calls(provider: &TestProvider, n: usize) {
    while provider.calls() < n {
        tokio::task::yield_now().await;
    }
}
