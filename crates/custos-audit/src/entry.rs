// entry.rs — Audit entry data model and canonical hashing form.
//
// Entries form one global chain across all tools: ids are strictly
// increasing for the whole log, and each entry's hash covers a canonical
// serialization of its fields plus the previous entry's hash. The payload
// is a BTreeMap so its canonical (key-sorted) order is structural — the
// hash cannot depend on how the caller happened to insert keys.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::hasher;

/// A single audit entry — one link in the hash chain.
///
/// References a tool by `tool_id` only; the audit log never owns or
/// mutates tool state. Immutable and permanent once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// Position in the single global sequence, strictly increasing across
    /// the entire log (not per tool).
    pub id: u64,

    /// The tool this entry concerns (weak reference).
    pub tool_id: String,

    /// What happened, e.g. "checkout", "return", "custody_denied".
    pub action: String,

    /// Who performed or attempted the action.
    pub actor: String,

    /// When the action happened (UTC).
    pub timestamp: DateTime<Utc>,

    /// Hash of the previous entry in the log. None for the first entry,
    /// and for all entries when chaining is disabled.
    pub previous_hash: Option<String>,

    /// SHA-256 over this entry's canonical fields plus `previous_hash`.
    /// None when chaining is disabled.
    pub entry_hash: Option<String>,

    /// Arbitrary string key/value context. Sorted by key (BTreeMap), so
    /// canonical order is inherent.
    #[serde(default)]
    pub payload: BTreeMap<String, String>,
}

impl AuditEntry {
    /// Create an entry with no payload and no hashes. The hashes are
    /// derived by [`AuditLog::append`](crate::AuditLog::append), never by
    /// the caller.
    pub fn new(
        id: u64,
        tool_id: impl Into<String>,
        action: impl Into<String>,
        actor: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tool_id: tool_id.into(),
            action: action.into(),
            actor: actor.into(),
            timestamp,
            previous_hash: None,
            entry_hash: None,
            payload: BTreeMap::new(),
        }
    }

    /// Add one payload key/value and return self (builder pattern).
    pub fn with_payload_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Replace the whole payload and return self.
    pub fn with_payload(mut self, payload: BTreeMap<String, String>) -> Self {
        self.payload = payload;
        self
    }

    /// The payload flattened to `key=value` pairs joined by `;`, in key
    /// order. Used for CSV export; the hash preimage uses the JSON
    /// encoding instead, which escapes separators.
    pub fn canonical_payload(&self) -> String {
        let pairs: Vec<String> = self
            .payload
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.join(";")
    }

    /// The canonical string this entry's hash is computed over: a JSON
    /// object with sorted keys covering every field except `entry_hash`
    /// itself, timestamp in fixed-precision RFC 3339.
    ///
    /// JSON string escaping makes the encoding unambiguous — no field
    /// value can masquerade as a delimiter or bleed into a neighboring
    /// field, so two distinct entries can never share a preimage.
    pub fn hash_preimage(&self) -> String {
        serde_json::json!({
            "action": self.action,
            "actor": self.actor,
            "id": self.id,
            "payload": self.payload,
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            "tool_id": self.tool_id,
        })
        .to_string()
    }

    /// Recompute this entry's hash from its stored fields.
    pub fn compute_hash(&self) -> String {
        hasher::hash_str(&self.hash_preimage())
    }
}
