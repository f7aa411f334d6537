//! # custos-calibration
//!
//! Pure calibration policy: is a tool's calibration valid at a given
//! instant, and what is its upcoming calibration window?
//!
//! Every function here takes the evaluation instant `at` explicitly — the
//! core never reads a wall clock, which keeps custody decisions
//! deterministic and trivially testable. Callers that want "now" pass
//! `Utc::now()` at the integration boundary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use custos_domain::Tool;

/// Whether a tool's calibration is valid at instant `at`.
///
/// Tools that do not require calibration are always valid. For all others
/// the calibration must lapse strictly after `at`: a tool whose
/// `calibration_due` equals `at` is already expired.
pub fn is_calibration_valid(tool: &Tool, at: DateTime<Utc>) -> bool {
    if !tool.calibration_required {
        return true;
    }
    tool.calibration_due > at
}

/// The upcoming calibration window for a tool: `(start, end)` where `end`
/// is the calibration due instant and `start` precedes it by the grace
/// period. Used for upcoming/overdue reporting only; custody decisions use
/// [`is_calibration_valid`].
pub fn next_calibration_window(tool: &Tool, grace_period_days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = tool.calibration_due;
    let start = end - Duration::days(grace_period_days);
    (start, end)
}

/// Where a tool stands relative to its calibration window at a given
/// instant. Report-level convenience over the two policy functions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    /// Calibration not required for this tool.
    Exempt,
    /// Valid, and `at` is before the grace window opens.
    Valid,
    /// Valid, but inside the grace window — calibration is coming due.
    DueSoon,
    /// Calibration has lapsed.
    Overdue,
}

/// Classify a tool's calibration state at `at`, using a grace window of
/// `grace_period_days` before the due instant.
pub fn calibration_status(tool: &Tool, at: DateTime<Utc>, grace_period_days: i64) -> CalibrationStatus {
    if !tool.calibration_required {
        return CalibrationStatus::Exempt;
    }
    if !is_calibration_valid(tool, at) {
        return CalibrationStatus::Overdue;
    }
    let (start, _end) = next_calibration_window(tool, grace_period_days);
    if at >= start {
        CalibrationStatus::DueSoon
    } else {
        CalibrationStatus::Valid
    }
}
