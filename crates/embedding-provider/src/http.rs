//! HTTP client for a remote embedding archive.
//!
//! Protocol:
//!
//! ```text
//! POST {base_url}/v1/embeddings/grid
//! Authorization: Bearer <token>
//! { "bounds": {...}, "year": 2022, "rows": 50, "cols": 50, "project": "..." }
//!
//! 200 { "rows": 50, "cols": 50, "dimensions": 64, "values": [f32 | null, ...] }
//! ```
//!
//! `null` components mark no-data cells and are stored as zeros.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use change_common::{BoundingBox, EmbeddingGrid, GridSize};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{ProviderError, Result};
use crate::provider::{check_request, run_cancellable, EmbeddingProvider};

/// Well-known credential locations, searched after any explicit path.
pub const DEFAULT_CREDENTIAL_PATHS: [&str; 2] =
    ["/app/credentials.json", "/run/secrets/embedding-credentials"];

/// Per-user credential location relative to `$HOME`.
pub const USER_CREDENTIAL_PATH: &str = ".config/embedding-archive/credentials";

/// Settings for [`HttpArchive`].
#[derive(Debug, Clone)]
pub struct HttpArchiveConfig {
    /// Archive root, without trailing slash.
    pub base_url: String,
    /// Billing or tenant project forwarded with every request.
    pub project: Option<String>,
    /// Explicit credentials file, tried before the well-known locations.
    pub credentials_path: Option<PathBuf>,
    /// Client-side timeout per HTTP request.
    pub request_timeout: Duration,
}

impl HttpArchiveConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project: None,
            credentials_path: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Parsed credentials file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    AccessToken {
        access_token: String,
    },
    ServiceAccount {
        #[serde(rename = "type")]
        kind: String,
        client_email: String,
        private_key: String,
    },
}

impl Credentials {
    fn is_usable(&self) -> bool {
        match self {
            Credentials::AccessToken { access_token } => !access_token.trim().is_empty(),
            Credentials::ServiceAccount {
                kind,
                client_email,
                private_key,
            } => kind == "service_account" && !client_email.is_empty() && !private_key.is_empty(),
        }
    }
}

/// Candidate credential files in search order.
pub fn credential_candidates(explicit: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    paths.extend(DEFAULT_CREDENTIAL_PATHS.iter().map(PathBuf::from));
    if let Some(home) = home {
        paths.push(home.join(USER_CREDENTIAL_PATH));
    }
    paths
}

/// Load the first usable credentials file among `candidates`.
///
/// Missing, empty and unparsable files are skipped.
pub fn discover_credentials(candidates: &[PathBuf]) -> Result<(PathBuf, Credentials)> {
    for path in candidates {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        if contents.trim().is_empty() {
            debug!(path = %path.display(), "Skipping empty credentials file");
            continue;
        }
        match serde_json::from_str::<Credentials>(&contents) {
            Ok(creds) if creds.is_usable() => return Ok((path.clone(), creds)),
            Ok(_) => warn!(path = %path.display(), "Credentials file has empty fields"),
            Err(e) => warn!(path = %path.display(), error = %e, "Unreadable credentials file"),
        }
    }
    let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(ProviderError::Auth(format!(
        "no usable credentials found (searched: {})",
        searched.join(", ")
    )))
}

/// Map a non-success archive status to an error.
pub fn classify_status(status: StatusCode, body: &str, year: i32) -> ProviderError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body, 200));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::Quota(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout(detail),
        StatusCode::NOT_FOUND => ProviderError::DataUnavailable { year },
        _ => ProviderError::Unknown(detail),
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Unknown(err.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Serialize)]
struct GridRequest<'a> {
    bounds: &'a BoundingBox,
    year: i32,
    rows: usize,
    cols: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
}

/// Archive response body.
#[derive(Debug, Deserialize)]
pub struct GridResponse {
    pub rows: usize,
    pub cols: usize,
    pub dimensions: usize,
    pub values: Vec<Option<f32>>,
}

impl GridResponse {
    /// Check the payload against the request and build the grid.
    pub fn into_grid(self, bounds: &BoundingBox, year: i32, size: GridSize) -> Result<EmbeddingGrid> {
        if self.rows != size.rows || self.cols != size.cols {
            return Err(ProviderError::InvalidResponse(format!(
                "requested {}x{} grid, archive returned {}x{}",
                size.rows, size.cols, self.rows, self.cols
            )));
        }
        let data: Vec<f32> = self
            .values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();
        EmbeddingGrid::new(*bounds, year, size, self.dimensions, data)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Embedding archive reached over HTTP.
pub struct HttpArchive {
    config: HttpArchiveConfig,
    client: Client,
    token: RwLock<Option<String>>,
    initialized: AtomicBool,
}

impl HttpArchive {
    pub fn new(config: HttpArchiveConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ProviderError::Unknown(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            token: RwLock::new(None),
            initialized: AtomicBool::new(false),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Turn credentials into a bearer token.
    async fn access_token(&self, creds: Credentials) -> Result<String> {
        match creds {
            Credentials::AccessToken { access_token } => Ok(access_token),
            Credentials::ServiceAccount {
                client_email,
                private_key,
                ..
            } => {
                let resp = self
                    .client
                    .post(self.url("/v1/auth/token"))
                    .json(&serde_json::json!({
                        "client_email": client_email,
                        "private_key": private_key,
                    }))
                    .send()
                    .await
                    .map_err(map_transport_error)?;
                let status = resp.status();
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(match classify_status(status, &body, 0) {
                        ProviderError::DataUnavailable { .. } => ProviderError::Auth(format!(
                            "token exchange endpoint not found (HTTP {})",
                            status.as_u16()
                        )),
                        other => other,
                    });
                }
                let token: TokenResponse = resp
                    .json()
                    .await
                    .map_err(|e| ProviderError::Auth(format!("bad token response: {}", e)))?;
                Ok(token.access_token)
            }
        }
    }

    /// Best-effort reachability check.
    async fn probe(&self) {
        match self.client.get(self.url("/v1/health")).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(url = %self.config.base_url, "Embedding archive reachable");
            }
            Ok(resp) => warn!(
                status = resp.status().as_u16(),
                "Embedding archive health probe failed"
            ),
            Err(e) => warn!(error = %e, "Embedding archive health probe failed"),
        }
    }

    async fn fetch(&self, bounds: &BoundingBox, year: i32, size: GridSize) -> Result<EmbeddingGrid> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ProviderError::NotInitialized)?;

        let body = GridRequest {
            bounds,
            year,
            rows: size.rows,
            cols: size.cols,
            project: self.config.project.as_deref(),
        };

        let resp = self
            .client
            .post(self.url("/v1/embeddings/grid"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, &text, year));
        }

        let payload: GridResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::InvalidResponse(e.to_string())
            }
        })?;
        payload.into_grid(bounds, year, size)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpArchive {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(url = %self.config.base_url))]
    async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let home = std::env::var_os("HOME").map(PathBuf::from);
        let candidates = credential_candidates(self.config.credentials_path.as_deref(), home.as_deref());
        let (path, creds) = discover_credentials(&candidates)?;
        info!(path = %path.display(), "Using embedding archive credentials");

        let token = self.access_token(creds).await?;
        *self.token.write().await = Some(token);

        self.probe().await;
        self.initialized.store(true, Ordering::SeqCst);
        info!("Embedding archive client initialized");
        Ok(())
    }

    async fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        *self.token.write().await = None;
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, bounds, cancel), fields(rows = size.rows, cols = size.cols))]
    async fn fetch_embedding_grid(
        &self,
        bounds: &BoundingBox,
        year: i32,
        size: GridSize,
        cancel: &CancellationToken,
    ) -> Result<EmbeddingGrid> {
        if !self.is_initialized() {
            return Err(ProviderError::NotInitialized);
        }
        check_request(bounds, year, size)?;
        run_cancellable(cancel, self.fetch(bounds, year, size)).await
    }
}
