// error.rs — Custody rejection taxonomy.
//
// Each variant is a distinct failure mode with a distinct caller remedy:
// PermissionDenied is never retried; AlreadyCheckedOut/NotCheckedOut are
// state conflicts where the caller should re-fetch; CalibrationExpired is a
// business-rule rejection that routes to a calibration workflow.

use thiserror::Error;

/// Errors returned by the custody rules engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The user's role does not permit this custody action.
    #[error("user '{user_id}' is not permitted to perform this custody action")]
    PermissionDenied { user_id: String },

    /// Checkout was attempted on a tool already in someone's custody.
    #[error("tool '{tool_id}' is already checked out to '{holder}'")]
    AlreadyCheckedOut { tool_id: String, holder: String },

    /// Return was attempted on a tool that is not checked out.
    #[error("tool '{tool_id}' is not checked out")]
    NotCheckedOut { tool_id: String },

    /// The tool's calibration has lapsed and the checkout required validity.
    #[error("tool '{tool_id}' calibration expired at {calibration_due}")]
    CalibrationExpired {
        tool_id: String,
        calibration_due: chrono::DateTime<chrono::Utc>,
    },
}

impl CustodyError {
    /// Short machine-friendly name for this rejection, used in audit
    /// payloads and boundary-layer status mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            CustodyError::PermissionDenied { .. } => "permission_denied",
            CustodyError::AlreadyCheckedOut { .. } => "already_checked_out",
            CustodyError::NotCheckedOut { .. } => "not_checked_out",
            CustodyError::CalibrationExpired { .. } => "calibration_expired",
        }
    }
}
