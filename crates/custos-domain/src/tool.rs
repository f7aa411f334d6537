// tool.rs — The Tool aggregate and its custody history.
//
// A Tool plus its CheckoutEvent history form one consistency boundary: the
// history is append-only and exclusively owned by the aggregate. The custody
// rules engine is the only code that mutates a Tool; this crate just defines
// the data and the `is_checked_out` predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which direction a custody event moved the tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutKind {
    /// The tool left inventory into a user's custody.
    Checkout,
    /// The tool came back into inventory.
    Return,
}

/// A single immutable custody event, appended to [`Tool::history`].
///
/// Never mutated or removed after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutEvent {
    pub kind: CheckoutKind,
    /// The user who performed the action.
    pub user_id: String,
    /// When the action happened (UTC, caller-supplied).
    pub timestamp: DateTime<Utc>,
}

/// A physical tool under calibration control.
///
/// Invariant: `holder.is_some()` exactly when the tool is checked out.
/// Created when a tool is provisioned (outside this core); mutated only by
/// the custody rules engine; never deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique identifier, e.g. an asset tag.
    pub tool_id: String,
    /// When the current calibration lapses.
    pub calibration_due: DateTime<Utc>,
    /// Whether this tool needs a valid calibration to be used at all.
    pub calibration_required: bool,
    /// The user currently holding the tool, if any.
    pub holder: Option<String>,
    /// When the tool last left inventory.
    pub last_checkout: Option<DateTime<Utc>>,
    /// Append-only custody history, oldest first.
    pub history: Vec<CheckoutEvent>,
}

impl Tool {
    /// Create a freshly provisioned tool: in inventory, empty history.
    pub fn new(
        tool_id: impl Into<String>,
        calibration_due: DateTime<Utc>,
        calibration_required: bool,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            calibration_due,
            calibration_required,
            holder: None,
            last_checkout: None,
            history: Vec::new(),
        }
    }

    /// Whether the tool is currently in someone's custody.
    pub fn is_checked_out(&self) -> bool {
        self.holder.is_some()
    }
}
