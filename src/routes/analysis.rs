use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{
    ImuWindow, MotifsResponse, SessionStartResponse, SessionStopResponse, SynchronyResponse,
};
use crate::AppState;

/// Samples fed to one analysis pass, about 1s of IMU data at 100Hz.
const ANALYSIS_WINDOW_SAMPLES: usize = 100;
const ANALYSIS_WINDOW_MS: i64 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopRequest {
    session_id: String,
}

/// POST /api/v1/analysis/start - open a session with a fresh id
async fn start_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionStartResponse>, ApiError> {
    let session_id = state.sessions.create(None)?;
    tracing::info!("Started analysis session {}", session_id);
    Ok(Json(SessionStartResponse::new(session_id)))
}

/// PUT /api/v1/analysis/stream - append one window of samples
async fn stream_window(
    State(state): State<Arc<AppState>>,
    Json(window): Json<ImuWindow>,
) -> Result<StatusCode, ApiError> {
    let received = window.samples.len();
    state.sessions.append(&window.session_id, window.samples)?;
    tracing::debug!(
        "Buffered {} samples for session {} (total {})",
        received,
        window.session_id,
        state.sessions.sample_count(&window.session_id)
    );
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/analysis/motifs?sessionId=<id> - score the latest window
async fn get_motifs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<MotifsResponse>, ApiError> {
    let session_id = query
        .session_id
        .ok_or(ApiError::MissingParameter("sessionId"))?;
    if !state.sessions.contains(&session_id) {
        return Err(ApiError::SessionNotFound(session_id));
    }

    // Copy the window out first so no buffer lock is held across the
    // inference await.
    let samples = state.sessions.latest(&session_id, ANALYSIS_WINDOW_SAMPLES);
    let output = state.gateway.analyze(&samples).await;

    Ok(Json(MotifsResponse::from_scores(
        session_id,
        &output.motif_scores,
        ANALYSIS_WINDOW_MS,
    )))
}

/// GET /api/v1/analysis/synchrony?sessionId=<id> - handler/dog synchrony
async fn get_synchrony(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SynchronyResponse>, ApiError> {
    let session_id = query
        .session_id
        .ok_or(ApiError::MissingParameter("sessionId"))?;
    if !state.sessions.contains(&session_id) {
        return Err(ApiError::SessionNotFound(session_id));
    }
    Ok(Json(SynchronyResponse::sampled(session_id)))
}

/// POST /api/v1/analysis/stop - close the session and report final stats
async fn stop_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StopRequest>,
) -> Result<Json<SessionStopResponse>, ApiError> {
    let snapshot = state.sessions.stop(&request.session_id)?;
    tracing::info!(
        "Stopped session {} after {:.1}s with {} samples",
        request.session_id,
        snapshot.duration_s,
        snapshot.total_samples
    );
    Ok(Json(SessionStopResponse::new(request.session_id, snapshot)))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/analysis/start", post(start_analysis))
        .route("/api/v1/analysis/stream", put(stream_window))
        .route("/api/v1/analysis/motifs", get(get_motifs))
        .route("/api/v1/analysis/synchrony", get(get_synchrony))
        .route("/api/v1/analysis/stop", post(stop_analysis))
        .with_state(state)
}
