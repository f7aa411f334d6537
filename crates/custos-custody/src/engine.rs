// engine.rs — Checkout/return transition rules.
//
// Every checkout flows through `checkout_tool`, which checks:
//
// 1. Is the user's role allowed to take custody? → No → PermissionDenied
// 2. Is the tool already held? → Yes → AlreadyCheckedOut
// 3. Is the calibration valid (when required)? → No → CalibrationExpired
//
// The order is deliberate: authorization is evaluated first so an
// unauthorized caller learns nothing about tool state from the error.
// All checks complete before any field is touched, so a rejected call
// leaves the tool byte-for-byte unchanged.

use chrono::{DateTime, Utc};

use custos_calibration::is_calibration_valid;
use custos_domain::{CheckoutEvent, CheckoutKind, Role, Tool, User};

use crate::error::CustodyError;

/// Check a tool out into `user`'s custody at instant `at`.
///
/// On success the tool's holder and last-checkout are set, a checkout event
/// is appended to the aggregate's history, and a copy of that event is
/// returned. `require_calibration_valid` is normally true; passing false
/// lets an admin workflow move an out-of-calibration tool (e.g. to ship it
/// to the calibration lab) without forging its due date.
pub fn checkout_tool(
    tool: &mut Tool,
    user: &User,
    at: DateTime<Utc>,
    require_calibration_valid: bool,
) -> Result<CheckoutEvent, CustodyError> {
    if !user.can_checkout() {
        return Err(CustodyError::PermissionDenied {
            user_id: user.user_id.clone(),
        });
    }

    if let Some(holder) = &tool.holder {
        return Err(CustodyError::AlreadyCheckedOut {
            tool_id: tool.tool_id.clone(),
            holder: holder.clone(),
        });
    }

    if require_calibration_valid && !is_calibration_valid(tool, at) {
        return Err(CustodyError::CalibrationExpired {
            tool_id: tool.tool_id.clone(),
            calibration_due: tool.calibration_due,
        });
    }

    // All checks passed — the mutation below is all-or-nothing.
    let event = CheckoutEvent {
        kind: CheckoutKind::Checkout,
        user_id: user.user_id.clone(),
        timestamp: at,
    };
    tool.holder = Some(user.user_id.clone());
    tool.last_checkout = Some(at);
    tool.history.push(event.clone());

    Ok(event)
}

/// Return a tool to inventory at instant `at`.
///
/// Only the current holder may return a tool, except that an admin may
/// return any tool (recovering custody from a departed or unavailable
/// holder).
pub fn return_tool(tool: &mut Tool, user: &User, at: DateTime<Utc>) -> Result<CheckoutEvent, CustodyError> {
    let holder = match &tool.holder {
        Some(holder) => holder.clone(),
        None => {
            return Err(CustodyError::NotCheckedOut {
                tool_id: tool.tool_id.clone(),
            })
        }
    };

    if holder != user.user_id && user.role != Role::Admin {
        return Err(CustodyError::PermissionDenied {
            user_id: user.user_id.clone(),
        });
    }

    let event = CheckoutEvent {
        kind: CheckoutKind::Return,
        user_id: user.user_id.clone(),
        timestamp: at,
    };
    tool.holder = None;
    tool.history.push(event.clone());

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()
    }

    fn tool() -> Tool {
        Tool::new("T-100", due(), true)
    }

    #[test]
    fn technician_checks_out_available_tool() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);

        let event = checkout_tool(&mut t, &alice, at(), true).unwrap();

        assert_eq!(event.kind, CheckoutKind::Checkout);
        assert_eq!(event.user_id, "alice");
        assert_eq!(event.timestamp, at());
        assert_eq!(t.holder.as_deref(), Some("alice"));
        assert_eq!(t.last_checkout, Some(at()));
        assert_eq!(t.history.len(), 1);
    }

    #[test]
    fn checkout_of_held_tool_fails_regardless_of_role() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);
        checkout_tool(&mut t, &alice, at(), true).unwrap();

        for user in [User::new("bob", Role::Technician), User::new("root", Role::Admin)] {
            let err = checkout_tool(&mut t, &user, at(), true).unwrap_err();
            assert_eq!(
                err,
                CustodyError::AlreadyCheckedOut {
                    tool_id: "T-100".to_string(),
                    holder: "alice".to_string(),
                }
            );
        }
        // Holder unchanged by the rejected attempts.
        assert_eq!(t.holder.as_deref(), Some("alice"));
        assert_eq!(t.history.len(), 1);
    }

    #[test]
    fn viewer_checkout_denied_on_available_tool() {
        let mut t = tool();
        let carol = User::new("carol", Role::Viewer);

        let err = checkout_tool(&mut t, &carol, at(), true).unwrap_err();

        assert_eq!(
            err,
            CustodyError::PermissionDenied {
                user_id: "carol".to_string(),
            }
        );
        assert!(!t.is_checked_out());
        assert!(t.history.is_empty());
    }

    #[test]
    fn permission_is_checked_before_state() {
        // A viewer probing a held tool must get PermissionDenied, not
        // AlreadyCheckedOut — state is not revealed to unauthorized callers.
        let mut t = tool();
        checkout_tool(&mut t, &User::new("alice", Role::Technician), at(), true).unwrap();

        let err = checkout_tool(&mut t, &User::new("carol", Role::Viewer), at(), true).unwrap_err();
        assert_eq!(err.kind(), "permission_denied");
    }

    #[test]
    fn expired_calibration_blocks_checkout() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);
        let late = due() + chrono::Duration::days(1);

        let err = checkout_tool(&mut t, &alice, late, true).unwrap_err();

        assert_eq!(
            err,
            CustodyError::CalibrationExpired {
                tool_id: "T-100".to_string(),
                calibration_due: due(),
            }
        );
        // Rejection leaves the tool untouched.
        assert!(!t.is_checked_out());
        assert!(t.last_checkout.is_none());
        assert!(t.history.is_empty());
    }

    #[test]
    fn calibration_check_can_be_waived() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);
        let late = due() + chrono::Duration::days(1);

        checkout_tool(&mut t, &alice, late, false).unwrap();
        assert_eq!(t.holder.as_deref(), Some("alice"));
    }

    #[test]
    fn uncalibrated_tool_ignores_due_date() {
        let mut t = Tool::new("T-200", due(), false);
        let alice = User::new("alice", Role::Technician);
        let late = due() + chrono::Duration::days(30);

        checkout_tool(&mut t, &alice, late, true).unwrap();
        assert!(t.is_checked_out());
    }

    #[test]
    fn holder_returns_own_tool() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);
        checkout_tool(&mut t, &alice, at(), true).unwrap();

        let event = return_tool(&mut t, &alice, at() + chrono::Duration::hours(4)).unwrap();

        assert_eq!(event.kind, CheckoutKind::Return);
        assert!(!t.is_checked_out());
        assert_eq!(t.history.len(), 2);
        // last_checkout records the most recent departure, not the return.
        assert_eq!(t.last_checkout, Some(at()));
    }

    #[test]
    fn admin_returns_tool_held_by_someone_else() {
        let mut t = tool();
        checkout_tool(&mut t, &User::new("alice", Role::Technician), at(), true).unwrap();

        let root = User::new("root", Role::Admin);
        let event = return_tool(&mut t, &root, at()).unwrap();

        assert_eq!(event.user_id, "root");
        assert!(!t.is_checked_out());
    }

    #[test]
    fn non_holder_cannot_return() {
        let mut t = tool();
        checkout_tool(&mut t, &User::new("alice", Role::Technician), at(), true).unwrap();

        let err = return_tool(&mut t, &User::new("bob", Role::Technician), at()).unwrap_err();

        assert_eq!(err.kind(), "permission_denied");
        assert_eq!(t.holder.as_deref(), Some("alice"));
    }

    #[test]
    fn return_of_available_tool_fails() {
        let mut t = tool();
        let err = return_tool(&mut t, &User::new("alice", Role::Technician), at()).unwrap_err();
        assert_eq!(
            err,
            CustodyError::NotCheckedOut {
                tool_id: "T-100".to_string(),
            }
        );
        assert!(t.history.is_empty());
    }

    #[test]
    fn history_accumulates_across_cycles() {
        let mut t = tool();
        let alice = User::new("alice", Role::Technician);
        let bob = User::new("bob", Role::Technician);

        checkout_tool(&mut t, &alice, at(), true).unwrap();
        return_tool(&mut t, &alice, at() + chrono::Duration::hours(1)).unwrap();
        checkout_tool(&mut t, &bob, at() + chrono::Duration::hours(2), true).unwrap();

        let kinds: Vec<CheckoutKind> = t.history.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![CheckoutKind::Checkout, CheckoutKind::Return, CheckoutKind::Checkout]
        );
        assert_eq!(t.holder.as_deref(), Some("bob"));
    }
}
