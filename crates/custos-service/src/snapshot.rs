// snapshot.rs — Disaster-recovery dump of the tool and audit tables.
//
// A snapshot is a plain serialized copy with no integrity guarantee of its
// own: a restored snapshot is only as trustworthy as its source. The
// tamper-evidence claim belongs to the audit chain, which can be verified
// after restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use custos_audit::AuditEntry;
use custos_domain::Tool;

use crate::error::ServiceError;
use crate::service::CustodyService;

/// A point-in-time dump of tools and audit entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was taken (UTC).
    pub taken_at: DateTime<Utc>,
    pub tools: Vec<Tool>,
    pub entries: Vec<AuditEntry>,
}

impl Snapshot {
    /// Capture the current state of a service.
    pub fn capture(service: &CustodyService) -> Result<Self, ServiceError> {
        Ok(Self {
            taken_at: Utc::now(),
            tools: service.tools()?,
            entries: service.audit_entries()?,
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ServiceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load this snapshot's state into a service, replacing its tables.
    pub fn restore_into(self, service: &CustodyService) -> Result<(), ServiceError> {
        service.restore(self.tools, self.entries)
    }
}
