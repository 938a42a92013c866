//! `HttpArchive` against a local axum stub.

use std::fs;
use std::time::Duration;

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use change_common::GridSize;
use embedding_provider::{
    EmbeddingProvider, HttpArchive, HttpArchiveConfig, ProviderCategory, ProviderError,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use test_utils::{regions, years};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn credentials(dir: &TempDir, contents: Value) -> HttpArchiveConfig {
    let path = dir.path().join("credentials.json");
    fs::write(&path, contents.to_string()).unwrap();
    HttpArchiveConfig {
        credentials_path: Some(path),
        ..HttpArchiveConfig::new("http://unused")
    }
}

fn token_file(dir: &TempDir, base_url: &str) -> HttpArchiveConfig {
    HttpArchiveConfig {
        base_url: base_url.to_string(),
        ..credentials(dir, json!({"access_token": "static-token"}))
    }
}

async fn grid_2x2(headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if auth != Some("Bearer exchanged") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    assert_eq!(body["rows"], 2);
    assert_eq!(body["cols"], 2);
    Ok(Json(json!({
        "rows": 2,
        "cols": 2,
        "dimensions": 2,
        "values": [1.0, 0.0, 0.0, 1.0, null, 0.5, 0.6, 0.8]
    })))
}

fn status_only(status: StatusCode) -> Router {
    Router::new()
        .route("/v1/health", get(|| async { "ok" }))
        .route("/v1/embeddings/grid", post(move || async move { status }))
}

async fn fetch(archive: &HttpArchive) -> Result<change_common::EmbeddingGrid, ProviderError> {
    archive
        .fetch_embedding_grid(
            &regions::SMALL,
            years::REFERENCE,
            GridSize::new(2, 2),
            &CancellationToken::new(),
        )
        .await
}

#[tokio::test]
async fn test_service_account_exchanges_token_and_fetches() {
    let app = Router::new()
        .route(
            "/v1/auth/token",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["client_email"], "svc@example.com");
                Json(json!({"access_token": "exchanged"}))
            }),
        )
        .route("/v1/health", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/v1/embeddings/grid", post(grid_2x2));
    let base_url = serve(app).await;

    let dir = TempDir::new().unwrap();
    let config = HttpArchiveConfig {
        base_url,
        ..credentials(
            &dir,
            json!({
                "type": "service_account",
                "client_email": "svc@example.com",
                "private_key": "KEY"
            }),
        )
    };
    let archive = HttpArchive::new(config).unwrap();

    // A failing health check does not block initialization.
    archive.initialize().await.unwrap();
    assert!(archive.is_initialized());

    let grid = fetch(&archive).await.unwrap();
    assert_eq!(grid.size(), GridSize::new(2, 2));
    assert_eq!(grid.dimensions(), 2);
    assert_eq!(grid.year(), years::REFERENCE);
}

#[tokio::test]
async fn test_rejected_token_exchange_is_auth_error() {
    let app = Router::new().route(
        "/v1/auth/token",
        post(|| async { StatusCode::UNAUTHORIZED }),
    );
    let base_url = serve(app).await;

    let dir = TempDir::new().unwrap();
    let config = HttpArchiveConfig {
        base_url,
        ..credentials(
            &dir,
            json!({"client_email": "svc@example.com", "private_key": "KEY"}),
        )
    };
    let archive = HttpArchive::new(config).unwrap();

    let err = archive.initialize().await.unwrap_err();
    assert_eq!(err.category(), Some(ProviderCategory::Auth));
    assert!(!archive.is_initialized());
}

#[tokio::test]
async fn test_grid_status_codes_keep_category() {
    let cases = [
        (StatusCode::UNAUTHORIZED, ProviderCategory::Auth),
        (StatusCode::TOO_MANY_REQUESTS, ProviderCategory::Quota),
        (StatusCode::INTERNAL_SERVER_ERROR, ProviderCategory::Unknown),
    ];
    for (status, expected) in cases {
        let base_url = serve(status_only(status)).await;
        let dir = TempDir::new().unwrap();
        let archive = HttpArchive::new(token_file(&dir, &base_url)).unwrap();
        archive.initialize().await.unwrap();

        let err = fetch(&archive).await.unwrap_err();
        assert_eq!(err.category(), Some(expected), "{status}");
    }
}

#[tokio::test]
async fn test_slow_archive_is_timeout() {
    let app = Router::new().route(
        "/v1/embeddings/grid",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK
        }),
    );
    let base_url = serve(app).await;
    let dir = TempDir::new().unwrap();
    let config = HttpArchiveConfig {
        request_timeout: Duration::from_millis(200),
        ..token_file(&dir, &base_url)
    };
    let archive = HttpArchive::new(config).unwrap();
    archive.initialize().await.unwrap();

    let err = fetch(&archive).await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(_)), "{err:?}");
    assert_eq!(err.category(), Some(ProviderCategory::Timeout));
}

#[tokio::test]
async fn test_refused_connection_is_unknown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = TempDir::new().unwrap();
    let archive = HttpArchive::new(token_file(&dir, &base_url)).unwrap();
    // Unreachable health check only logs.
    archive.initialize().await.unwrap();

    let err = fetch(&archive).await.unwrap_err();
    assert_eq!(err.category(), Some(ProviderCategory::Unknown));
}
