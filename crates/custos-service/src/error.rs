// error.rs — Service-boundary error types.
//
// Custody and audit errors pass through unchanged so the boundary layer
// can map them to statuses (PermissionDenied → 403, state conflicts → 409,
// CalibrationExpired → a calibration workflow). The variants added here
// are lookup failures and the export visibility gate.

use thiserror::Error;

use custos_audit::AuditError;
use custos_custody::CustodyError;

/// Errors returned by [`CustodyService`](crate::CustodyService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No tool with this id is registered.
    #[error("unknown tool '{tool_id}'")]
    UnknownTool { tool_id: String },

    /// No user with this id is registered.
    #[error("unknown user '{user_id}'")]
    UnknownUser { user_id: String },

    /// The user's role does not permit viewing exports.
    #[error("user '{user_id}' is not permitted to view audit exports")]
    ExportDenied { user_id: String },

    /// A custody rule rejected the action.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// The audit subsystem rejected or failed the operation.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Snapshot serialization or restore failed.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A shared lock was poisoned by a panicking writer.
    #[error("internal lock poisoned: {0}")]
    LockPoisoned(String),
}
