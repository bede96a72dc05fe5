//! Intake/recommendation workflow state machine.
//!
//! Drives a session through gather-missing-info, collect-answers,
//! summarize, and recommend. Progress is monotonic: questions already
//! asked are never re-asked, and accumulated answers are never dropped.

use crate::engine::{fallback_intake, fallback_recommendations};
use crate::error::check_version;
use crate::{
    ProcuraError, RecommendationEngine, Result, SessionStore, build_structured_summary,
    normalize_scope, postprocess_recommendations,
};
use chrono::Utc;
use procura_types::{IntakeResult, IntakeSession, IntakeStage, ProjectContext};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Inputs for one intake round.
#[derive(Debug, Clone, Default)]
pub struct RunIntakeRequest {
    pub product_name: String,
    pub budget_usd: f64,
    pub quantity: i64,
    pub scope_text: String,
    pub uploaded_summaries: Vec<String>,
    pub project_context: Option<ProjectContext>,
    pub vendors: Vec<String>,
}

/// Result of one intake round: the (possibly reused) session id and the
/// questions that are genuinely new for this session.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub session_id: String,
    pub intake: IntakeResult,
    pub version: u64,
}

/// Intake workflow over TTL-stored sessions.
pub struct IntakeWorkflow {
    store: SessionStore<IntakeSession>,
    engine: Arc<dyn RecommendationEngine>,
}

impl IntakeWorkflow {
    pub fn new(ttl: Option<Duration>, engine: Arc<dyn RecommendationEngine>) -> Self {
        Self {
            store: SessionStore::new(ttl),
            engine,
        }
    }

    /// Run an intake round: validate inputs, ask the engine for candidate
    /// questions, filter out questions this session has already seen, and
    /// persist the merged state. A fresh session id is generated when none
    /// is supplied.
    pub fn run_intake(
        &self,
        session_id: Option<String>,
        req: RunIntakeRequest,
    ) -> Result<IntakeOutcome> {
        let product_name = req.product_name.trim().to_string();
        if product_name.is_empty() {
            return Err(ProcuraError::Validation {
                field: "product_name",
                reason: "must be non-empty".to_string(),
            });
        }
        if req.quantity < 1 {
            return Err(ProcuraError::Validation {
                field: "quantity",
                reason: "must be >= 1".to_string(),
            });
        }
        if !(req.budget_usd >= 0.0) {
            return Err(ProcuraError::Validation {
                field: "budget_usd",
                reason: "must be >= 0".to_string(),
            });
        }
        let quantity = u32::try_from(req.quantity).map_err(|_| ProcuraError::Validation {
            field: "quantity",
            reason: format!("must be at most {}", u32::MAX),
        })?;

        let scope = normalize_scope(
            &req.scope_text,
            &req.uploaded_summaries,
            req.project_context.as_ref(),
            &req.vendors,
        );
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut intake = self
            .engine
            .intake(&product_name, req.budget_usd, quantity, &scope)
            .unwrap_or_else(|e| {
                warn!(target: "procura::intake", "engine intake failed, using fallback: {e}");
                fallback_intake(&product_name, req.budget_usd, quantity)
            });

        let prev = self.store.get(&session_id);
        let (answers, mut asked, version): (BTreeMap<_, _>, BTreeSet<_>, u64) = match &prev {
            Some(s) => (s.answers.clone(), s.asked_questions.clone(), s.version),
            None => (BTreeMap::new(), BTreeSet::new(), 0),
        };

        // A question already surfaced in any prior round is never re-asked.
        intake
            .missing_info_questions
            .retain(|question| !asked.contains(question));
        asked.extend(intake.missing_info_questions.iter().cloned());

        let new_questions = intake.missing_info_questions.len();
        let session = IntakeSession {
            product_name,
            budget_usd: req.budget_usd,
            quantity,
            scope_text: scope,
            stage: IntakeStage::Questioning,
            intake_result: intake.clone(),
            answers,
            asked_questions: asked,
            structured_summary: prev.as_ref().and_then(|s| s.structured_summary.clone()),
            project_summary: prev.as_ref().and_then(|s| s.project_summary.clone()),
            recommendations: prev.as_ref().and_then(|s| s.recommendations.clone()),
            project_context: req.project_context,
            vendors: req.vendors,
            uploaded_summaries: req.uploaded_summaries,
            version: version + 1,
            updated_at: Utc::now(),
        };
        let version = session.version;
        self.store.set(&session_id, session);

        info!(
            target: "procura::intake",
            "intake completed for session {session_id}: {new_questions} new questions"
        );
        Ok(IntakeOutcome {
            session_id,
            intake,
            version,
        })
    }

    /// Merge submitted answers into the session. New values win on key
    /// collision; previously recorded keys are never dropped. Does not
    /// regenerate recommendations.
    pub fn submit_answers(
        &self,
        session_id: &str,
        answers: BTreeMap<String, String>,
        expected_version: Option<u64>,
    ) -> Result<IntakeSession> {
        let mut session = self.require(session_id)?;
        check_version(session.version, expected_version)?;

        session.answers.extend(answers);
        if matches!(
            session.stage,
            IntakeStage::Questioning | IntakeStage::Answered
        ) {
            session.stage = IntakeStage::Answered;
        }
        session.version += 1;
        session.updated_at = Utc::now();
        self.store.set(session_id, session.clone());

        info!(
            target: "procura::intake",
            "answers saved for session {session_id}: {} total",
            session.answers.len()
        );
        Ok(session)
    }

    /// Build the structured summary and a user-facing narrative. The
    /// narrative falls back to the structured text verbatim when the
    /// engine cannot rephrase it.
    pub fn generate_summary(&self, session_id: &str) -> Result<IntakeSession> {
        let mut session = self.require(session_id)?;

        let structured = build_structured_summary(&session);
        let narrative = self.engine.rephrase_summary(&structured).unwrap_or_else(|e| {
            warn!(
                target: "procura::intake",
                "engine rephrase failed, using structured summary: {e}"
            );
            structured.clone()
        });

        session.structured_summary = Some(structured);
        session.project_summary = Some(narrative);
        session.stage = IntakeStage::Summarized;
        session.version += 1;
        session.updated_at = Utc::now();
        self.store.set(session_id, session.clone());
        Ok(session)
    }

    /// Generate (or regenerate) recommendations. Uses the stored structured
    /// summary unless `rebuild_summary` is set or none exists yet.
    /// Re-entrant: every call increments the version and leaves the
    /// accumulated answers and asked questions untouched.
    pub fn generate_recommendations(
        &self,
        session_id: &str,
        rebuild_summary: bool,
    ) -> Result<IntakeSession> {
        let mut session = self.require(session_id)?;

        let structured = match (&session.structured_summary, rebuild_summary) {
            (Some(existing), false) => existing.clone(),
            _ => build_structured_summary(&session),
        };

        let recs = self
            .engine
            .recommend(
                &session.product_name,
                session.budget_usd,
                session.quantity,
                &structured,
            )
            .unwrap_or_else(|e| {
                warn!(
                    target: "procura::intake",
                    "engine recommend failed, using fallback: {e}"
                );
                fallback_recommendations(&session.product_name, session.budget_usd, session.quantity)
            });
        let recs = postprocess_recommendations(recs);

        session.structured_summary = Some(structured);
        session.recommendations = Some(recs);
        session.stage = IntakeStage::Recommended;
        session.version += 1;
        session.updated_at = Utc::now();
        self.store.set(session_id, session.clone());

        info!(
            target: "procura::intake",
            "recommendations generated for session {session_id} (version {})",
            session.version
        );
        Ok(session)
    }

    /// Pure read of session state. Has no side effects beyond the store's
    /// lazy expiry check.
    pub fn get_session(&self, session_id: &str) -> Result<IntakeSession> {
        self.require(session_id)
    }

    fn require(&self, session_id: &str) -> Result<IntakeSession> {
        self.store
            .get(session_id)
            .ok_or_else(|| ProcuraError::NotFound(session_id.to_string()))
    }
}
