use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::history::{PassHistory, PassSummary};

const DEFAULT_PASSES: usize = 10;
const MAX_PASSES: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub history: Arc<PassHistory>,
    /// `None` when no recorder was installed (tests, or a second instance).
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(history: Arc<PassHistory>) -> Self {
        Self {
            history,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/debug/passes", get(debug_passes))
        .route("/metrics", get(metrics))
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct PassesQuery {
    #[serde(default)]
    n: Option<usize>,
}

async fn debug_passes(
    State(state): State<AppState>,
    Query(q): Query<PassesQuery>,
) -> Json<Vec<PassSummary>> {
    let n = q.n.unwrap_or(DEFAULT_PASSES).clamp(1, MAX_PASSES);
    Json(state.history.snapshot_last_n(n))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(h) => (StatusCode::OK, h.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
