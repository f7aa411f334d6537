// export.rs — Deterministic CSV export of audit entries.
//
// Rows are sorted by (tool_id, id) before serialization, not by append
// order, so exports are reproducible and diffable no matter how entries
// from different tools interleaved at append time. Payloads are flattened
// to key-sorted `k=v` pairs joined by `;`.
//
// The manifest is unsigned. A deployment that needs tamper evidence of the
// export artifact itself (not just the underlying log) must add a detached
// signature over the serialized bytes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::AuditEntry;
use crate::hasher::HASH_ALGORITHM;

/// Metadata accompanying an exported CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportManifest {
    /// When the export was generated (UTC, caller-supplied).
    pub generated_at: DateTime<Utc>,
    /// Number of data rows in the CSV.
    pub record_count: usize,
    /// Algorithm used for the underlying chain hashes.
    pub hash_algorithm: String,
}

/// Render audit entries as CSV plus a manifest.
///
/// `generated_at` is supplied by the caller so the serialization itself
/// stays clock-free: the same entry set always yields byte-identical CSV.
/// Columns: `id, tool_id, action, actor, timestamp, payload`.
pub fn export_audit_csv(entries: &[AuditEntry], generated_at: DateTime<Utc>) -> (String, ExportManifest) {
    let mut sorted: Vec<&AuditEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| (&a.tool_id, a.id).cmp(&(&b.tool_id, b.id)));

    let mut csv = String::from("id,tool_id,action,actor,timestamp,payload\n");
    for entry in &sorted {
        let row = [
            entry.id.to_string(),
            entry.tool_id.clone(),
            entry.action.clone(),
            entry.actor.clone(),
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            entry.canonical_payload(),
        ];
        let rendered: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        csv.push_str(&rendered.join(","));
        csv.push('\n');
    }

    let manifest = ExportManifest {
        generated_at,
        record_count: sorted.len(),
        hash_algorithm: HASH_ALGORITHM.to_string(),
    };

    (csv, manifest)
}

/// Quote a CSV field per RFC 4180: fields containing a comma, quote, or
/// line break are wrapped in double quotes with embedded quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
