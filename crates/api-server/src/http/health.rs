use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{OkResponse, ReadinessResponse};
use tracing::warn;

use super::AppState;
use super::errors::service_unavailable_response;

pub(super) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(OkResponse { ok: true }))
}

pub(super) async fn readyz(State(state): State<AppState>) -> Response {
    let report = state.dictionary_report.as_ref();
    let total_entries = report.total_entries();

    if total_entries == 0 {
        warn!("readiness check failed: every reference dictionary is empty");
        return service_unavailable_response(
            "dictionaries_unavailable",
            "Reference dictionaries are not loaded",
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            ok: true,
            active_sessions: state.sessions.len(),
            total_entries,
            dictionaries: report.dictionaries.clone(),
        }),
    )
        .into_response()
}
