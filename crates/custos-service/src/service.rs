// service.rs — CustodyService: the operations a boundary layer calls.
//
// All state lives behind mutexes. Lock ordering is tools → ledger,
// everywhere, so the two locks can never deadlock. The tools lock is held
// across the entire read-check-write custody sequence: the "observe
// available, then mark checked out" step is atomic per tool because it is
// atomic for the whole table. Appends go through the ledger lock, giving
// the chain its single global total order; readers take the same lock and
// therefore always see a consistent, non-torn snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use custos_audit::{export_audit_csv, AuditEntry, AuditLog, ExportManifest};
use custos_calibration::{calibration_status, is_calibration_valid, CalibrationStatus};
use custos_custody::{checkout_tool, return_tool, CustodyError};
use custos_domain::{CheckoutEvent, Tool, User};

use crate::error::ServiceError;

/// Integration-boundary policy knobs.
#[derive(Debug, Clone)]
pub struct ServicePolicy {
    /// Whether checkout requires a valid calibration. Normally true;
    /// false supports admin workflows that move out-of-calibration tools.
    pub require_calibration_valid: bool,
    /// Whether rejected custody attempts also generate audit entries
    /// (action "custody_denied") for security monitoring.
    pub audit_denied_attempts: bool,
    /// Whether the audit ledger chains hashes. Disabling trades tamper
    /// evidence for write cost.
    pub hash_chaining: bool,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            require_calibration_valid: true,
            audit_denied_attempts: false,
            hash_chaining: true,
        }
    }
}

/// In-memory custody service: tool and user directories plus the audit
/// ledger, exposing the custody, verification, and export operations.
pub struct CustodyService {
    tools: Mutex<HashMap<String, Tool>>,
    users: Mutex<HashMap<String, User>>,
    ledger: Mutex<AuditLog>,
    policy: ServicePolicy,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ServiceError> {
    mutex
        .lock()
        .map_err(|e| ServiceError::LockPoisoned(format!("{} lock: {}", what, e)))
}

impl CustodyService {
    /// Create a service with the default policy.
    pub fn new() -> Self {
        Self::with_policy(ServicePolicy::default())
    }

    /// Create a service with an explicit policy.
    pub fn with_policy(policy: ServicePolicy) -> Self {
        let ledger = if policy.hash_chaining {
            AuditLog::new()
        } else {
            AuditLog::without_chaining()
        };
        Self {
            tools: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            ledger: Mutex::new(ledger),
            policy,
        }
    }

    /// Register (or replace) a tool in the directory.
    pub fn register_tool(&self, tool: Tool) -> Result<(), ServiceError> {
        lock(&self.tools, "tools")?.insert(tool.tool_id.clone(), tool);
        Ok(())
    }

    /// Register (or replace) a user in the directory.
    pub fn register_user(&self, user: User) -> Result<(), ServiceError> {
        lock(&self.users, "users")?.insert(user.user_id.clone(), user);
        Ok(())
    }

    /// A copy of a tool's current state, for inspection.
    pub fn get_tool(&self, tool_id: &str) -> Result<Tool, ServiceError> {
        lock(&self.tools, "tools")?
            .get(tool_id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownTool {
                tool_id: tool_id.to_string(),
            })
    }

    fn get_user(&self, user_id: &str) -> Result<User, ServiceError> {
        lock(&self.users, "users")?
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownUser {
                user_id: user_id.to_string(),
            })
    }

    /// Check a tool out to a user. `at` defaults to now.
    ///
    /// The tool mutation and the audit append happen under the held locks,
    /// in one unit of work. The append can only fail once the custody
    /// checks have passed if the ledger lock is poisoned; an `Err` of
    /// [`ServiceError::LockPoisoned`] therefore means the checkout itself
    /// stood and only its audit record is in doubt — a process-fatal
    /// condition, not one to retry.
    pub fn checkout(
        &self,
        tool_id: &str,
        user_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<CheckoutEvent, ServiceError> {
        let at = at.unwrap_or_else(Utc::now);
        let user = self.get_user(user_id)?;

        let mut tools = lock(&self.tools, "tools")?;
        let tool = tools
            .get_mut(tool_id)
            .ok_or_else(|| ServiceError::UnknownTool {
                tool_id: tool_id.to_string(),
            })?;

        match checkout_tool(tool, &user, at, self.policy.require_calibration_valid) {
            Ok(event) => {
                info!(tool_id, user_id, "tool checked out");
                self.record_custody(tool_id, "checkout", user_id, at, BTreeMap::new())?;
                Ok(event)
            }
            Err(err) => {
                self.record_denied(tool_id, "checkout", user_id, at, &err)?;
                Err(err.into())
            }
        }
    }

    /// Return a tool to inventory. `at` defaults to now.
    ///
    /// Failure semantics match [`checkout`](Self::checkout): a
    /// [`ServiceError::LockPoisoned`] result after the custody checks
    /// passed means the return stood but its audit record is in doubt.
    pub fn return_tool(
        &self,
        tool_id: &str,
        user_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<CheckoutEvent, ServiceError> {
        let at = at.unwrap_or_else(Utc::now);
        let user = self.get_user(user_id)?;

        let mut tools = lock(&self.tools, "tools")?;
        let tool = tools
            .get_mut(tool_id)
            .ok_or_else(|| ServiceError::UnknownTool {
                tool_id: tool_id.to_string(),
            })?;
        let previous_holder = tool.holder.clone();

        match return_tool(tool, &user, at) {
            Ok(event) => {
                info!(tool_id, user_id, "tool returned");
                let mut payload = BTreeMap::new();
                if let Some(holder) = previous_holder {
                    payload.insert("previous_holder".to_string(), holder);
                }
                self.record_custody(tool_id, "return", user_id, at, payload)?;
                Ok(event)
            }
            Err(err) => {
                self.record_denied(tool_id, "return", user_id, at, &err)?;
                Err(err.into())
            }
        }
    }

    /// Whether a tool's calibration is valid. `at` defaults to now.
    pub fn is_calibration_valid(
        &self,
        tool_id: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<bool, ServiceError> {
        let at = at.unwrap_or_else(Utc::now);
        let tool = self.get_tool(tool_id)?;
        Ok(is_calibration_valid(&tool, at))
    }

    /// Calibration standing of every registered tool at `at`, sorted by
    /// tool id. Used for upcoming/overdue reports.
    pub fn calibration_report(
        &self,
        at: Option<DateTime<Utc>>,
        grace_period_days: i64,
    ) -> Result<Vec<(String, CalibrationStatus)>, ServiceError> {
        let at = at.unwrap_or_else(Utc::now);
        let tools = lock(&self.tools, "tools")?;
        let mut report: Vec<(String, CalibrationStatus)> = tools
            .values()
            .map(|tool| {
                (
                    tool.tool_id.clone(),
                    calibration_status(tool, at, grace_period_days),
                )
            })
            .collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(report)
    }

    /// Append an arbitrary audit entry (e.g. calibration updates or notes
    /// from the boundary layer). Sequencing and hashing are handled here;
    /// the caller supplies only the facts.
    pub fn append_audit_entry(
        &self,
        tool_id: &str,
        action: &str,
        actor: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<AuditEntry, ServiceError> {
        let mut ledger = lock(&self.ledger, "ledger")?;
        let entry = AuditEntry::new(ledger.next_id(), tool_id, action, actor, Utc::now())
            .with_payload(payload);
        let stored = ledger.append(entry)?;
        Ok(stored.clone())
    }

    /// Verify the audit chain. A false result is a critical integrity
    /// incident requiring manual investigation, not a recoverable error.
    pub fn verify_audit_log(&self) -> Result<bool, ServiceError> {
        let ledger = lock(&self.ledger, "ledger")?;
        let ok = ledger.verify();
        if !ok {
            warn!("audit log verification failed: chain is broken");
        }
        Ok(ok)
    }

    /// Export the audit log as CSV plus a manifest, optionally filtered to
    /// one tool. Gated by the requesting user's export capability.
    pub fn export_audit_csv(
        &self,
        requested_by: &str,
        tool_filter: Option<&str>,
    ) -> Result<(String, ExportManifest), ServiceError> {
        let user = self.get_user(requested_by)?;
        if !user.can_view_exports() {
            return Err(ServiceError::ExportDenied {
                user_id: requested_by.to_string(),
            });
        }

        let ledger = lock(&self.ledger, "ledger")?;
        let entries: Vec<AuditEntry> = match tool_filter {
            Some(tool_id) => ledger
                .entries()
                .iter()
                .filter(|e| e.tool_id == tool_id)
                .cloned()
                .collect(),
            None => ledger.entries().to_vec(),
        };
        Ok(export_audit_csv(&entries, Utc::now()))
    }

    /// All audit entries, oldest first, for snapshotting and tests.
    pub fn audit_entries(&self) -> Result<Vec<AuditEntry>, ServiceError> {
        Ok(lock(&self.ledger, "ledger")?.entries().to_vec())
    }

    /// All registered tools, sorted by tool id.
    pub fn tools(&self) -> Result<Vec<Tool>, ServiceError> {
        let tools = lock(&self.tools, "tools")?;
        let mut all: Vec<Tool> = tools.values().cloned().collect();
        all.sort_by(|a, b| a.tool_id.cmp(&b.tool_id));
        Ok(all)
    }

    /// Replace the tool table and audit ledger with restored state.
    ///
    /// A restored snapshot carries no integrity guarantee of its own;
    /// callers should run [`verify_audit_log`](Self::verify_audit_log)
    /// afterwards if the snapshot's provenance is in doubt.
    pub fn restore(&self, tools: Vec<Tool>, entries: Vec<AuditEntry>) -> Result<(), ServiceError> {
        let restored = AuditLog::load(entries, self.policy.hash_chaining)?;
        let mut table = lock(&self.tools, "tools")?;
        let mut ledger = lock(&self.ledger, "ledger")?;
        table.clear();
        for tool in tools {
            table.insert(tool.tool_id.clone(), tool);
        }
        *ledger = restored;
        Ok(())
    }

    // Appends the audit record for a successful custody action. Called with
    // the tools lock held, so the tool mutation and its audit entry land in
    // the same unit of work.
    fn record_custody(
        &self,
        tool_id: &str,
        action: &str,
        actor: &str,
        at: DateTime<Utc>,
        payload: BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        let mut ledger = lock(&self.ledger, "ledger")?;
        let entry = AuditEntry::new(ledger.next_id(), tool_id, action, actor, at).with_payload(payload);
        ledger.append(entry)?;
        Ok(())
    }

    // Optionally audits a rejected custody attempt, per policy.
    fn record_denied(
        &self,
        tool_id: &str,
        attempted: &str,
        actor: &str,
        at: DateTime<Utc>,
        err: &CustodyError,
    ) -> Result<(), ServiceError> {
        if !self.policy.audit_denied_attempts {
            return Ok(());
        }
        let mut ledger = lock(&self.ledger, "ledger")?;
        let entry = AuditEntry::new(ledger.next_id(), tool_id, "custody_denied", actor, at)
            .with_payload_entry("attempted", attempted)
            .with_payload_entry("error", err.kind());
        ledger.append(entry)?;
        Ok(())
    }
}

impl Default for CustodyService {
    fn default() -> Self {
        Self::new()
    }
}
