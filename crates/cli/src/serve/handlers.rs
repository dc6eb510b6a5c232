//! HTTP route handlers: health, upload, and one handler per analytic.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;

use conforma_align::{AlignError, AlignedArtifacts};
use conforma_analyze::{
    amount_correlation, conformance_bins, conformance_by_resource, conformance_by_role,
    fitness_per_trace, outcome_distribution, trace_sequences, unique_sequences_per_bin,
    AnalyzeError,
};
use conforma_model::{log_from_value, model_from_value, read_log, ArtifactError};

use super::cache::pair_fingerprint;
use super::state::{AppState, ArtifactPair};
use super::json_error;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let has_artifacts = state.artifacts.read().await.is_some();
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "artifacts_uploaded": has_artifacts,
    });
    (StatusCode::OK, Json(response))
}

/// POST /upload request body: both artifact documents inline.
#[derive(Deserialize)]
pub(crate) struct UploadRequest {
    model: serde_json::Value,
    log: serde_json::Value,
}

/// POST /upload
///
/// Validates both documents, persists them as the single most-recent pair,
/// swaps the request-scoped artifact reference, and invalidates the
/// alignment cache. Responds with summaries of both artifacts.
pub(crate) async fn handle_upload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Response {
    let model = match model_from_value(&request.model, "model") {
        Ok(model) => model,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };
    let log = match log_from_value(&request.log, "log") {
        Ok(log) => log,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    let model_bytes = match serde_json::to_vec_pretty(&request.model) {
        Ok(bytes) => bytes,
        Err(e) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    };
    let log_bytes = match serde_json::to_vec_pretty(&request.log) {
        Ok(bytes) => bytes,
        Err(e) => return json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    };

    let model_path = state.upload_dir.join("model.json");
    let log_path = state.upload_dir.join("log.json");
    if let Err(e) = std::fs::create_dir_all(&state.upload_dir)
        .and_then(|_| std::fs::write(&model_path, &model_bytes))
        .and_then(|_| std::fs::write(&log_path, &log_bytes))
    {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("failed to persist artifacts: {}", e),
        )
        .into_response();
    }

    let pair = ArtifactPair {
        model_path,
        log_path,
        fingerprint: pair_fingerprint(&model_bytes, &log_bytes),
        uploaded_at: time::OffsetDateTime::now_utc(),
    };

    // Swap the pair first, then drop stale cache entries; a reader that
    // races the swap either sees the old pair with its cached alignment or
    // the new pair with a cold cache.
    *state.artifacts.write().await = Some(pair.clone());
    state.cache.clear().await;

    let (net, _, _) = model.to_net();
    let event_count: usize = log.traces.iter().map(|t| t.events.len()).sum();

    let response = serde_json::json!({
        "to_be_process": {
            "id": model.id,
            "tasks": model.tasks.len(),
            "endEvents": model.end_events.len(),
            "flows": model.flows.len(),
            "places": net.places.len(),
            "transitions": net.transitions.len(),
        },
        "as_is_process": {
            "traces": log.traces.len(),
            "events": event_count,
        },
        "fingerprint": pair.fingerprint,
        "uploaded_at": pair.uploaded_at.format(&Rfc3339).unwrap_or_default(),
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// The current pair, or a 400 when nothing has been uploaded yet.
async fn current_pair(state: &AppState) -> Result<ArtifactPair, Response> {
    match state.artifacts.read().await.clone() {
        Some(pair) => Ok(pair),
        None => Err(
            json_error(StatusCode::BAD_REQUEST, "no artifact pair uploaded yet").into_response(),
        ),
    }
}

/// The cached (or freshly computed) alignment for the current pair.
async fn aligned_pair(state: &AppState) -> Result<Arc<AlignedArtifacts>, Response> {
    let pair = current_pair(state).await?;
    state
        .cache
        .get_or_compute(&pair.fingerprint, pair.model_path, pair.log_path)
        .await
        .map_err(|e| align_error_response(&e))
}

fn align_error_response(error: &AlignError) -> Response {
    let status = match error {
        AlignError::Artifact(ArtifactError::NotFound { .. }) => StatusCode::NOT_FOUND,
        AlignError::Artifact(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, &error.to_string()).into_response()
}

fn analyze_error_response(error: &AnalyzeError) -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string()).into_response()
}

/// GET /api/fitness
pub(crate) async fn handle_fitness(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => Json(fitness_per_trace(&aligned.results)).into_response(),
        Err(response) => response,
    }
}

/// GET /api/conformance-bins
pub(crate) async fn handle_conformance_bins(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => {
            let fitness_data = fitness_per_trace(&aligned.results);
            Json(conformance_bins(&fitness_data)).into_response()
        }
        Err(response) => response,
    }
}

/// GET /api/outcome-distribution
pub(crate) async fn handle_outcome_distribution(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => {
            match outcome_distribution(&aligned.model, &aligned.log, &aligned.results) {
                Ok(distribution) => Json(distribution).into_response(),
                Err(e) => analyze_error_response(&e),
            }
        }
        Err(response) => response,
    }
}

/// GET /api/conformance-by-role
pub(crate) async fn handle_conformance_by_role(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => match conformance_by_role(&aligned.log, &aligned.results) {
            Ok(breakdown) => Json(breakdown).into_response(),
            Err(e) => analyze_error_response(&e),
        },
        Err(response) => response,
    }
}

/// GET /api/conformance-by-resource
pub(crate) async fn handle_conformance_by_resource(
    State(state): State<Arc<AppState>>,
) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => match conformance_by_resource(&aligned.log, &aligned.results) {
            Ok(breakdown) => Json(breakdown).into_response(),
            Err(e) => analyze_error_response(&e),
        },
        Err(response) => response,
    }
}

/// GET /api/requested-amounts
pub(crate) async fn handle_requested_amounts(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => match amount_correlation(&aligned.log, &aligned.results) {
            Ok(samples) => Json(samples).into_response(),
            Err(e) => analyze_error_response(&e),
        },
        Err(response) => response,
    }
}

/// GET /api/unique-sequences
pub(crate) async fn handle_unique_sequences(State(state): State<Arc<AppState>>) -> Response {
    match aligned_pair(&state).await {
        Ok(aligned) => match unique_sequences_per_bin(&aligned.log, &aligned.results) {
            Ok(bins) => Json(bins).into_response(),
            Err(e) => analyze_error_response(&e),
        },
        Err(response) => response,
    }
}

/// GET /api/trace-sequences
///
/// Needs only the log, so it reads the document directly instead of
/// forcing an alignment computation.
pub(crate) async fn handle_trace_sequences(State(state): State<Arc<AppState>>) -> Response {
    let pair = match current_pair(&state).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };
    match read_log(&pair.log_path) {
        Ok(log) => Json(trace_sequences(&log)).into_response(),
        Err(e) => align_error_response(&AlignError::Artifact(e)),
    }
}
