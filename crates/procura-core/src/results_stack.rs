//! Results-stack ("KIBA") session workflow.
//!
//! A session walks through request, vendor search, evaluation, and
//! selection, with every mutation audit-logged and version-checked. The
//! run history is append-only: `append_run` is the only operation that
//! can grow it, and no patch can shorten or replace it.

use crate::error::check_version;
use crate::{ProcuraError, Result, SessionStore};
use chrono::Utc;
use procura_types::{AuditEntry, FinalSnapshot, KibaSession, Run, SessionPhase};
use serde_json::{Map, Value, json};
use tracing::info;

/// Top-level keys a patch may never touch.
const PROTECTED_KEYS: [&str; 4] = ["sessionId", "version", "audit", "final"];

/// Workflow over results-stack sessions. Deployed with `ttl = None`, so
/// sessions live for the life of the process.
pub struct ResultsStack {
    store: SessionStore<KibaSession>,
}

impl ResultsStack {
    pub fn new(ttl: Option<std::time::Duration>) -> Self {
        Self {
            store: SessionStore::new(ttl),
        }
    }

    /// Fetch a session, initializing a fresh open one on first access.
    pub fn get_or_create(&self, session_id: &str) -> KibaSession {
        match self.store.get(session_id) {
            Some(session) => session,
            None => {
                let session = KibaSession::new(session_id, "system");
                self.store.set(session_id, session.clone());
                info!(target: "procura::kiba", "initialized session {session_id}");
                session
            }
        }
    }

    /// Shallow top-level merge of `patch` into the session record.
    ///
    /// Each supplied top-level key replaces the stored one wholesale.
    /// Protected keys are silently ignored, and the stored run history
    /// (plus `activeRunId` and the session identity fields) always wins
    /// over whatever the patch carried. Appends one audit entry naming
    /// the touched keys.
    pub fn patch(
        &self,
        session_id: &str,
        patch: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> Result<KibaSession> {
        let stored = self.get_or_create(session_id);
        check_version(stored.version, expected_version)?;

        let Value::Object(mut obj) = serde_json::to_value(&stored)? else {
            unreachable!("session serializes to an object");
        };

        let mut touched: Vec<String> = Vec::new();
        for (key, value) in patch {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            touched.push(key.clone());
            obj.insert(key, value);
        }

        let mut session: KibaSession = serde_json::from_value(Value::Object(obj))?;

        // The merged `steps` may have carried an arbitrary vendorSearch;
        // the stored run history is authoritative.
        session.steps.vendor_search.runs = stored.steps.vendor_search.runs;
        session.steps.vendor_search.active_run_id = stored.steps.vendor_search.active_run_id;
        session.session_id = stored.session_id;
        session.audit = stored.audit;
        session.final_snapshot = stored.final_snapshot;

        session.version = stored.version + 1;
        session.audit.push(AuditEntry {
            at: Utc::now(),
            by: "user".to_string(),
            event: "patch".to_string(),
            payload: Some(Value::Array(
                touched.iter().cloned().map(Value::String).collect(),
            )),
        });
        self.store.set(session_id, session.clone());

        info!(
            target: "procura::kiba",
            "patched session {session_id} (keys: {touched:?}, version {})",
            session.version
        );
        Ok(session)
    }

    /// Record a vendor-search run and make it the active one. The run must
    /// be a JSON object with a non-empty `runId` string; everything else
    /// it carries is preserved verbatim.
    pub fn append_run(&self, session_id: &str, run: Value) -> Result<KibaSession> {
        let run: Run = serde_json::from_value(run).map_err(|e| ProcuraError::Validation {
            field: "run",
            reason: e.to_string(),
        })?;
        if run.run_id.trim().is_empty() {
            return Err(ProcuraError::Validation {
                field: "run.runId",
                reason: "must be a non-empty string".to_string(),
            });
        }

        let mut session = self.get_or_create(session_id);
        let run_id = run.run_id.clone();
        session.steps.vendor_search.runs.push(run);
        session.steps.vendor_search.active_run_id = Some(run_id.clone());
        session.version += 1;
        session.audit.push(AuditEntry {
            at: Utc::now(),
            by: "user".to_string(),
            event: "run_created".to_string(),
            payload: Some(json!({ "runId": run_id })),
        });
        self.store.set(session_id, session.clone());

        info!(
            target: "procura::kiba",
            "recorded run {run_id} for session {session_id} ({} total)",
            session.steps.vendor_search.runs.len()
        );
        Ok(session)
    }

    /// Close a session, snapshotting its outcome. Fails with `NotFound`
    /// on an unknown session (close never auto-creates) and with
    /// `PreconditionFailed` naming the first unmet precondition: at least
    /// one run, a non-empty shortlist, and a selected vendor.
    pub fn close(&self, session_id: &str) -> Result<KibaSession> {
        let stored = self
            .store
            .get(session_id)
            .ok_or_else(|| ProcuraError::NotFound(session_id.to_string()))?;

        if stored.steps.vendor_search.runs.is_empty() {
            return Err(ProcuraError::PreconditionFailed(
                "no vendor-search runs recorded",
            ));
        }
        if stored.steps.evaluation.shortlist_vendor_ids.is_empty() {
            return Err(ProcuraError::PreconditionFailed("shortlist is empty"));
        }
        let selected = stored
            .steps
            .selection
            .selected_vendor_id
            .as_deref()
            .unwrap_or("");
        if selected.trim().is_empty() {
            return Err(ProcuraError::PreconditionFailed("no vendor selected"));
        }

        let mut session = stored.clone();
        let active_run_id = session.steps.vendor_search.active_run_id.clone();
        let vendors_snapshot = session
            .steps
            .vendor_search
            .runs
            .iter()
            .find(|run| Some(&run.run_id) == active_run_id.as_ref())
            .map(|run| run.vendors_snapshot.clone())
            .filter(|snapshot| !snapshot.is_null())
            .unwrap_or_else(|| Value::Object(Map::new()));

        session.status = SessionPhase::Closed;
        session.final_snapshot = Some(FinalSnapshot {
            active_run_id,
            vendors_snapshot,
            selection: session.steps.selection.clone(),
            steps: session.steps.clone(),
        });
        session.version += 1;
        session.audit.push(AuditEntry {
            at: Utc::now(),
            by: "user".to_string(),
            event: "closed".to_string(),
            payload: None,
        });
        self.store.set(session_id, session.clone());

        info!(
            target: "procura::kiba",
            "closed session {session_id} (vendor: {selected}, version {})",
            session.version
        );
        Ok(session)
    }
}
