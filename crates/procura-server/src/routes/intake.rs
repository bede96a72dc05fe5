//! Intake workflow routes.

use super::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use procura_core::RunIntakeRequest;
use procura_types::{IntakeResult, ProjectContext, Recommendations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub product_name: String,
    #[serde(default)]
    pub budget_usd: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub scope_text: String,
    #[serde(default)]
    pub uploaded_summaries: Vec<String>,
    #[serde(default)]
    pub project_context: Option<ProjectContext>,
    #[serde(default)]
    pub vendors: Vec<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Serialize)]
pub struct IntakeResponse {
    pub session_id: String,
    pub intake: IntakeResult,
}

pub async fn intake_recommendations(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IntakeRequest>,
) -> Result<Json<IntakeResponse>, ApiError> {
    let outcome = state.intake.run_intake(
        req.session_id,
        RunIntakeRequest {
            product_name: req.product_name,
            budget_usd: req.budget_usd,
            quantity: req.quantity,
            scope_text: req.scope_text,
            uploaded_summaries: req.uploaded_summaries,
            project_context: req.project_context,
            vendors: req.vendors,
        },
    )?;

    Ok(Json(IntakeResponse {
        session_id: outcome.session_id,
        intake: outcome.intake,
    }))
}

#[derive(Deserialize)]
pub struct SubmitFollowupsRequest {
    pub session_id: String,
    #[serde(default)]
    pub followup_answers: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct SubmitFollowupsResponse {
    pub session_id: String,
    pub answers: BTreeMap<String, String>,
    pub message: &'static str,
}

pub async fn submit_followups(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitFollowupsRequest>,
) -> Result<Json<SubmitFollowupsResponse>, ApiError> {
    let session = state
        .intake
        .submit_answers(&req.session_id, req.followup_answers, None)?;

    Ok(Json(SubmitFollowupsResponse {
        session_id: req.session_id,
        answers: session.answers,
        message: "Answers saved successfully. Ready to generate project summary.",
    }))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub version: u64,
    pub intake: IntakeResult,
    pub answers: BTreeMap<String, String>,
    pub recommendations: Option<Recommendations>,
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.intake.get_session(&id)?;

    Ok(Json(SessionResponse {
        session_id: id,
        version: session.version,
        intake: session.intake_result,
        answers: session.answers,
        recommendations: session.recommendations,
    }))
}

#[derive(Deserialize)]
pub struct PatchAnswersRequest {
    #[serde(default)]
    pub followup_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Serialize)]
pub struct PatchAnswersResponse {
    pub session_id: String,
    pub answers: BTreeMap<String, String>,
    pub version: u64,
}

pub async fn patch_answers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PatchAnswersRequest>,
) -> Result<Json<PatchAnswersResponse>, ApiError> {
    let session = state
        .intake
        .submit_answers(&id, req.followup_answers, req.version)?;

    Ok(Json(PatchAnswersResponse {
        session_id: id,
        answers: session.answers,
        version: session.version,
    }))
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub session_id: String,
    pub project_summary: Option<String>,
    pub structured_summary: Option<String>,
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let session = state.intake.generate_summary(&id)?;

    Ok(Json(SummaryResponse {
        session_id: id,
        project_summary: session.project_summary,
        structured_summary: session.structured_summary,
    }))
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub session_id: String,
    pub version: u64,
    pub recommendations: Option<Recommendations>,
}

pub async fn generate_recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let session = state.intake.generate_recommendations(&id, false)?;

    Ok(Json(RecommendationsResponse {
        session_id: id,
        version: session.version,
        recommendations: session.recommendations,
    }))
}

/// Regeneration rebuilds the structured summary from current answers
/// before asking for fresh recommendations.
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let session = state.intake.generate_recommendations(&id, true)?;

    Ok(Json(RecommendationsResponse {
        session_id: id,
        version: session.version,
        recommendations: session.recommendations,
    }))
}
