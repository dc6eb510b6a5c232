//! `conforma serve` -- HTTP JSON API for the conformance dashboard.
//!
//! Exposes the alignment engine and the analytics suite as an async HTTP
//! service using `axum` + `tokio`. Artifacts arrive through a single
//! upload endpoint; every analytic endpoint then reads the most recent
//! pair through a request-scoped reference and obtains the alignment from
//! a fingerprint-keyed single-flight cache, so concurrent dashboard panels
//! trigger at most one alignment computation per uploaded pair.
//!
//! Endpoints:
//! - GET  /health                       - Server status
//! - POST /upload                       - Upload a (model, log) document pair
//! - GET  /api/fitness                  - Per-trace fitness
//! - GET  /api/conformance-bins         - Fitness histogram (10 bins)
//! - GET  /api/outcome-distribution     - Outcome correctness per bin
//! - GET  /api/conformance-by-role      - Mean fitness per role
//! - GET  /api/conformance-by-resource  - Mean fitness per resource
//! - GET  /api/requested-amounts        - Fitness vs requested amount
//! - GET  /api/unique-sequences         - Distinct activity sequences per bin
//! - GET  /api/trace-sequences          - Activity sequence per trace
//!
//! All responses use Content-Type: application/json; fatal errors are
//! `{"error": ...}` bodies with a 4xx/5xx status, never a partial result.

mod cache;
mod handlers;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use self::cache::{pair_fingerprint, AlignmentCache};
use self::handlers::{
    handle_conformance_bins, handle_conformance_by_resource, handle_conformance_by_role,
    handle_fitness, handle_health, handle_not_found, handle_outcome_distribution,
    handle_requested_amounts, handle_trace_sequences, handle_unique_sequences, handle_upload,
};
use self::state::{AppState, ArtifactPair, RateLimiter};

/// Maximum request body size: 10 MB.
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default rate limit: 60 requests per minute per IP.
const DEFAULT_RATE_LIMIT: u64 = 60;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Start the HTTP server on the given port, optionally pre-loading an
/// artifact pair from disk.
pub async fn start_server(
    port: u16,
    upload_dir: PathBuf,
    preload: Option<(PathBuf, PathBuf)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifacts = preload.and_then(|(model, log)| load_pair(&model, &log));

    // Rate limit: from CONFORMA_RATE_LIMIT env var, or default
    let rate_limit = std::env::var("CONFORMA_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);
    eprintln!("Rate limit: {} requests per minute per IP", rate_limit);

    let state = Arc::new(AppState {
        artifacts: tokio::sync::RwLock::new(artifacts),
        cache: AlignmentCache::new(),
        rate_limiter: RateLimiter::new(rate_limit),
        upload_dir,
    });

    // CORS: permissive for local dev; the dashboard is served from its own
    // origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/upload", post(handle_upload))
        .route("/api/fitness", get(handle_fitness))
        .route("/api/conformance-bins", get(handle_conformance_bins))
        .route("/api/outcome-distribution", get(handle_outcome_distribution))
        .route("/api/conformance-by-role", get(handle_conformance_by_role))
        .route(
            "/api/conformance-by-resource",
            get(handle_conformance_by_resource),
        )
        .route("/api/requested-amounts", get(handle_requested_amounts))
        .route("/api/unique-sequences", get(handle_unique_sequences))
        .route("/api/trace-sequences", get(handle_trace_sequences))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Conforma API listening on http://0.0.0.0:{}", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Validate and fingerprint a pre-loaded pair. Warns and starts empty on
/// any failure, matching upload semantics (a bad pair never half-loads).
fn load_pair(model_path: &Path, log_path: &Path) -> Option<ArtifactPair> {
    let model_bytes = match std::fs::read(model_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Warning: failed to read {}: {}", model_path.display(), e);
            return None;
        }
    };
    let log_bytes = match std::fs::read(log_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Warning: failed to read {}: {}", log_path.display(), e);
            return None;
        }
    };
    if let Err(e) = conforma_model::read_model(model_path) {
        eprintln!("Warning: failed to load model: {}", e);
        return None;
    }
    if let Err(e) = conforma_model::read_log(log_path) {
        eprintln!("Warning: failed to load log: {}", e);
        return None;
    }

    eprintln!(
        "Loaded artifact pair: {} + {}",
        model_path.display(),
        log_path.display()
    );
    Some(ArtifactPair {
        model_path: model_path.to_path_buf(),
        log_path: log_path.to_path_buf(),
        fingerprint: pair_fingerprint(&model_bytes, &log_bytes),
        uploaded_at: time::OffsetDateTime::now_utc(),
    })
}

/// Rate limiting middleware. Checks per-IP request rate before routing.
async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ip = addr.ip();
    match state.rate_limiter.check(ip).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            let body = serde_json::json!({
                "error": "rate limit exceeded",
                "retry_after": retry_after,
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
    }
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
