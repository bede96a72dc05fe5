//! Results-stack session types ("KIBA" procurement sessions).
//!
//! Field names follow the session wire format (camelCase), so these
//! records serialize exactly as the frontend stores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Lifecycle of a results-stack session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Open,
    Closed,
}

/// One recorded vendor-search run. Unknown fields are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub vendors_snapshot: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSearchStep {
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub active_run_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationStep {
    #[serde(default)]
    pub shortlist_vendor_ids: Vec<String>,
    #[serde(default)]
    pub notes_by_vendor_id: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStep {
    #[serde(default)]
    pub selected_vendor_id: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub total_award_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Steps {
    #[serde(default)]
    pub request: Map<String, Value>,
    #[serde(default)]
    pub vendor_search: VendorSearchStep,
    #[serde(default)]
    pub evaluation: EvaluationStep,
    #[serde(default)]
    pub selection: SelectionStep,
}

/// Immutable log record of one state-changing event on a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub by: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Snapshot captured when a session closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSnapshot {
    pub active_run_id: Option<String>,
    pub vendors_snapshot: Value,
    pub selection: SelectionStep,
    pub steps: Steps,
}

/// A multi-step procurement session with an audit-logged history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KibaSession {
    pub session_id: String,
    pub status: SessionPhase,
    pub current_step: String,
    pub steps: Steps,
    pub audit: Vec<AuditEntry>,
    pub version: u64,
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub final_snapshot: Option<FinalSnapshot>,
}

impl KibaSession {
    /// Fresh session in the `open` state with a single init audit entry.
    pub fn new(session_id: &str, actor: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            status: SessionPhase::Open,
            current_step: "request".to_string(),
            steps: Steps::default(),
            audit: vec![AuditEntry {
                at: Utc::now(),
                by: actor.to_string(),
                event: "session_init".to_string(),
                payload: None,
            }],
            version: 1,
            final_snapshot: None,
        }
    }
}
