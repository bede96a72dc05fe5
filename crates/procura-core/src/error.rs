//! Error types for Procura.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcuraError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("version conflict: server version is {server_version}")]
    VersionConflict { server_version: u64 },

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Optimistic concurrency check shared by the workflows: a caller-supplied
/// expected version must match the stored one exactly; `None` skips the
/// check.
pub(crate) fn check_version(
    stored: u64,
    expected: Option<u64>,
) -> Result<(), ProcuraError> {
    match expected {
        Some(v) if v != stored => Err(ProcuraError::VersionConflict { server_version: stored }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_version() {
        assert!(check_version(3, None).is_ok());
        assert!(check_version(3, Some(3)).is_ok());
        assert!(matches!(
            check_version(3, Some(2)),
            Err(ProcuraError::VersionConflict { server_version: 3 })
        ));
    }
}
