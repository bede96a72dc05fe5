//! Intake workflow types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Stage in the intake workflow lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    /// Intake ran, follow-up questions pending.
    Questioning,
    /// User submitted answers, no new intake round forced.
    Answered,
    /// A project summary has been generated and stored.
    Summarized,
    /// Final recommendations generated and stored.
    Recommended,
}

/// Result of one intake round: a requirements summary plus follow-up questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub requirements_summary: String,
    #[serde(default)]
    pub missing_info_questions: Vec<String>,
}

/// One candidate specification variant in a recommendation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecVariant {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub est_unit_price_usd: f64,
    #[serde(default)]
    pub est_total_usd: f64,
    #[serde(default)]
    pub lead_time_days: u32,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub rationale_summary: Vec<String>,
}

/// Recommendation set produced by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub variants: Vec<SpecVariant>,
    #[serde(default)]
    pub decision_notes: String,
}

/// Optional project context attached to an intake session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub procurement_type: String,
    #[serde(default)]
    pub service_program: String,
    #[serde(default)]
    pub technical_poc: String,
}

/// Server-held state for one intake workflow session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSession {
    pub product_name: String,
    pub budget_usd: f64,
    pub quantity: u32,
    pub scope_text: String,
    pub stage: IntakeStage,
    pub intake_result: IntakeResult,
    /// Accumulated question -> answer pairs. Keys are never dropped.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    /// Every question ever surfaced to the caller. Grows monotonically.
    #[serde(default)]
    pub asked_questions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_context: Option<ProjectContext>,
    #[serde(default)]
    pub vendors: Vec<String>,
    #[serde(default)]
    pub uploaded_summaries: Vec<String>,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}
