use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_s: f64,
    checks: BTreeMap<&'static str, CheckResult>,
}

#[derive(Serialize)]
struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

/// GET /healthz - service health with a live sidecar probe in real mode.
///
/// A down sidecar reports as degraded, not failing: analysis keeps
/// answering with stub output, so the service itself is still up.
async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut checks = BTreeMap::new();
    checks.insert(
        "service",
        CheckResult {
            status: "healthy",
            message: None,
            latency_ms: None,
        },
    );

    let mut overall = "healthy";
    if state.config.use_real_model {
        let start = Instant::now();
        let check = match state.backend.health_check().await {
            Ok(()) => CheckResult {
                status: "healthy",
                message: Some("Sidecar responding".to_string()),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            },
            Err(err) => {
                overall = "degraded";
                CheckResult {
                    status: "unhealthy",
                    message: Some(format!("Cannot reach sidecar: {}", err)),
                    latency_ms: Some(start.elapsed().as_millis() as u64),
                }
            }
        };
        checks.insert("model_backend", check);
    } else {
        checks.insert(
            "model_backend",
            CheckResult {
                status: "stub",
                message: Some("Real model disabled".to_string()),
                latency_ms: None,
            },
        );
    }

    Json(HealthResponse {
        status: overall,
        version: env!("CARGO_PKG_VERSION"),
        uptime_s: state.started_at.elapsed().as_secs_f64(),
        checks,
    })
}

/// GET /metrics - Prometheus text format
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let body = state.metrics.render(state.sessions.count());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}
