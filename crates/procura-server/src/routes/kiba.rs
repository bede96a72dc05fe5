//! Results-stack session routes.

use super::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use procura_types::KibaSession;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<KibaSession> {
    Json(state.results.get_or_create(&id))
}

/// Shallow-merge the request body into the session. A top-level `version`
/// field, when present, is the client's optimistic concurrency token and
/// is consumed here rather than merged.
pub async fn patch_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut patch): Json<Map<String, Value>>,
) -> Result<Json<KibaSession>, ApiError> {
    let expected_version = patch.remove("version").and_then(|v| v.as_u64());
    let session = state.results.patch(&id, patch, expected_version)?;
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct CreateRunRequest {
    pub run: Value,
}

pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateRunRequest>,
) -> Result<Json<KibaSession>, ApiError> {
    let session = state.results.append_run(&id, req.run)?;
    Ok(Json(session))
}

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<KibaSession>, ApiError> {
    let session = state.results.close(&id)?;
    Ok(Json(session))
}
