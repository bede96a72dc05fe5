//! HTTP route handlers.

pub mod intake;
pub mod kiba;

use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use procura_core::ProcuraError;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Core error wrapped for HTTP responses.
pub struct ApiError(ProcuraError);

impl From<ProcuraError> for ApiError {
    fn from(err: ProcuraError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::info!(target: "procura::api", "request failed: {}", self.0);
        match self.0 {
            ProcuraError::Validation { .. } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.0.to_string() })),
            )
                .into_response(),
            ProcuraError::PreconditionFailed(condition) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_failed",
                    "failed_precondition": condition,
                })),
            )
                .into_response(),
            ProcuraError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Session not found: {id}") })),
            )
                .into_response(),
            ProcuraError::VersionConflict { server_version } => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "version_conflict",
                    "serverVersion": server_version,
                })),
            )
                .into_response(),
            ProcuraError::Json(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid payload: {e}") })),
            )
                .into_response(),
        }
    }
}

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/intake_recommendations", post(intake::intake_recommendations))
        .route("/submit_followups", post(intake::submit_followups))
        .route("/session/{id}", get(intake::get_session))
        .route("/session/{id}/answers", patch(intake::patch_answers))
        .route("/session/{id}/generate_summary", post(intake::generate_summary))
        .route(
            "/session/{id}/generate_recommendations",
            post(intake::generate_recommendations),
        )
        .route("/session/{id}/regenerate", post(intake::regenerate))
        .route(
            "/kiba/sessions/{id}",
            get(kiba::get_session).patch(kiba::patch_session),
        )
        .route("/kiba/sessions/{id}/runs", post(kiba::create_run))
        .route("/kiba/sessions/{id}/close", post(kiba::close_session));

    Router::new().nest("/api", api).with_state(state)
}
