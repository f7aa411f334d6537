// ledger.rs — The in-memory append-only hash chain.
//
// The chain is a singly-linked list with backward hash pointers, stored as
// a contiguous growable Vec indexed by sequence position: previous_hash is
// read from the prior slot, so append and access are O(1) and verification
// is a single O(n) walk with no pointer chasing.
//
// Concurrency is the caller's concern: because each entry's previous_hash
// depends on the immediately preceding entry, appends must be serialized
// into one global total order for the whole log (see custos-service).

use tracing::{error, warn};

use crate::entry::AuditEntry;
use crate::error::AuditError;

/// The append-only audit ledger.
///
/// Ids are strictly increasing across the entire log — one global
/// sequence, not per tool. Entries are immutable and permanent once
/// appended; there is no update or delete.
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    chaining: bool,
}

impl AuditLog {
    /// Create an empty ledger with hash chaining enabled (the default).
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            chaining: true,
        }
    }

    /// Create an empty ledger without hash chaining.
    ///
    /// Entries are stored without derived hashes and `verify` trivially
    /// returns true: lower write cost, no tamper evidence. Surfaced as a
    /// warning so operators cannot miss the reduced assurance.
    pub fn without_chaining() -> Self {
        warn!("audit log created without hash chaining: tamper evidence is disabled");
        Self {
            entries: Vec::new(),
            chaining: false,
        }
    }

    /// Rehydrate a ledger from previously persisted entries (e.g. an
    /// [`AuditStore`](crate::AuditStore) backend).
    ///
    /// Validates that ids form a strictly increasing sequence; chain
    /// integrity of the loaded entries is checked separately via
    /// [`verify`](Self::verify).
    pub fn load(entries: Vec<AuditEntry>, chaining: bool) -> Result<Self, AuditError> {
        for pair in entries.windows(2) {
            if pair[1].id <= pair[0].id {
                return Err(AuditError::CorruptEntries {
                    id: pair[1].id,
                    reason: format!("id does not increase (follows {})", pair[0].id),
                });
            }
        }
        Ok(Self { entries, chaining })
    }

    /// Append an entry to the ledger.
    ///
    /// The entry's id must strictly exceed the last appended id; the log
    /// never renumbers or reorders. When chaining is enabled, the entry's
    /// `previous_hash` and `entry_hash` are derived here — any values the
    /// caller put in those fields are overwritten. On failure the ledger
    /// is left completely unmodified.
    pub fn append(&mut self, mut entry: AuditEntry) -> Result<&AuditEntry, AuditError> {
        if let Some(last) = self.entries.last() {
            if entry.id <= last.id {
                // Id assignment is an integration bug, not operator input.
                error!(
                    attempted = entry.id,
                    last_id = last.id,
                    "rejected audit append: id does not extend the sequence"
                );
                return Err(AuditError::InvalidSequence {
                    last_id: last.id,
                    attempted: entry.id,
                });
            }
        }

        if self.chaining {
            entry.previous_hash = self.entries.last().and_then(|prev| prev.entry_hash.clone());
            entry.entry_hash = Some(entry.compute_hash());
        } else {
            entry.previous_hash = None;
            entry.entry_hash = None;
        }

        self.entries.push(entry);
        let idx = self.entries.len() - 1;
        Ok(&self.entries[idx])
    }

    /// Verify the full hash chain.
    ///
    /// Walks the sequence in order, recomputing each entry's hash from its
    /// stored fields and checking both the recomputed hash against the
    /// stored one and the link to the previous entry's recomputed hash.
    /// Returns false at the first mismatch. A false result is a critical
    /// integrity incident: reliance on the log must halt pending manual
    /// investigation — there is no self-heal.
    pub fn verify(&self) -> bool {
        if !self.chaining {
            return true;
        }

        let mut previous_recomputed: Option<String> = None;
        for entry in &self.entries {
            if entry.previous_hash != previous_recomputed {
                error!(id = entry.id, "audit chain broken: previous_hash mismatch");
                return false;
            }
            let recomputed = entry.compute_hash();
            if entry.entry_hash.as_deref() != Some(recomputed.as_str()) {
                error!(id = entry.id, "audit chain broken: entry hash mismatch");
                return false;
            }
            previous_recomputed = Some(recomputed);
        }
        true
    }

    /// The next id that would extend the sequence.
    pub fn next_id(&self) -> u64 {
        self.entries.last().map(|e| e.id + 1).unwrap_or(1)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether hash chaining is enabled for this ledger.
    pub fn chaining_enabled(&self) -> bool {
        self.chaining
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, minute, 0).unwrap()
    }

    fn entry(id: u64, tool_id: &str, action: &str) -> AuditEntry {
        AuditEntry::new(id, tool_id, action, "alice", ts(id as u32 % 60))
    }

    #[test]
    fn first_entry_has_no_previous_hash() {
        let mut log = AuditLog::new();
        let stored = log.append(entry(1, "T-100", "checkout")).unwrap();
        assert!(stored.previous_hash.is_none());
        assert!(stored.entry_hash.is_some());
    }

    #[test]
    fn entries_link_to_predecessor() {
        let mut log = AuditLog::new();
        log.append(entry(1, "T-100", "checkout")).unwrap();
        log.append(entry(2, "T-100", "return")).unwrap();

        let first_hash = log.entries()[0].entry_hash.clone();
        assert_eq!(log.entries()[1].previous_hash, first_hash);
    }

    #[test]
    fn verify_accepts_intact_chain() {
        let mut log = AuditLog::new();
        for id in 1..=5 {
            log.append(entry(id, "T-100", "checkout")).unwrap();
        }
        assert!(log.verify());
    }

    #[test]
    fn verify_detects_field_rewrite() {
        let mut log = AuditLog::new();
        for id in 1..=3 {
            log.append(entry(id, "T-100", "checkout")).unwrap();
        }

        // Simulate an external rewrite of entry 2's actor without
        // recomputing hashes.
        let mut entries = log.entries().to_vec();
        entries[1].actor = "mallory".to_string();
        let tampered = AuditLog::load(entries, true).unwrap();

        assert!(!tampered.verify());
    }

    #[test]
    fn verify_detects_field_boundary_rewrite() {
        // Shuffling text between adjacent fields without recomputing hashes
        // must break the chain even though the concatenated bytes match.
        let mut log = AuditLog::new();
        log.append(AuditEntry::new(
            1,
            "T-100|calibrate",
            "checkout",
            "alice",
            ts(1),
        ))
        .unwrap();

        let mut entries = log.entries().to_vec();
        entries[0].tool_id = "T-100".to_string();
        entries[0].action = "calibrate|checkout".to_string();
        let tampered = AuditLog::load(entries, true).unwrap();

        assert!(!tampered.verify());
    }

    #[test]
    fn verify_detects_deleted_entry() {
        let mut log = AuditLog::new();
        for id in 1..=3 {
            log.append(entry(id, "T-100", "checkout")).unwrap();
        }

        let mut entries = log.entries().to_vec();
        entries.remove(1);
        let tampered = AuditLog::load(entries, true).unwrap();

        assert!(!tampered.verify());
    }

    #[test]
    fn verify_detects_forged_tail_hashes() {
        // An attacker who rewrites entry 1 AND recomputes its hash still
        // breaks entry 2's stored previous_hash link.
        let mut log = AuditLog::new();
        log.append(entry(1, "T-100", "checkout")).unwrap();
        log.append(entry(2, "T-100", "return")).unwrap();

        let mut entries = log.entries().to_vec();
        entries[0].actor = "mallory".to_string();
        entries[0].entry_hash = Some(entries[0].compute_hash());
        let tampered = AuditLog::load(entries, true).unwrap();

        assert!(!tampered.verify());
    }

    #[test]
    fn non_increasing_id_is_rejected_and_log_unchanged() {
        let mut log = AuditLog::new();
        log.append(entry(1, "T-100", "checkout")).unwrap();
        log.append(entry(2, "T-100", "return")).unwrap();
        let before = log.entries().to_vec();

        for bad_id in [2, 1, 0] {
            let err = log.append(entry(bad_id, "T-200", "checkout")).unwrap_err();
            assert!(matches!(
                err,
                AuditError::InvalidSequence {
                    last_id: 2,
                    attempted,
                } if attempted == bad_id
            ));
        }

        // Byte-for-byte unchanged.
        assert_eq!(log.entries(), before.as_slice());
        assert!(log.verify());
    }

    #[test]
    fn ids_may_skip_but_never_repeat() {
        let mut log = AuditLog::new();
        log.append(entry(1, "T-100", "checkout")).unwrap();
        // Gaps are allowed — strictly increasing is the only requirement.
        log.append(entry(10, "T-100", "return")).unwrap();
        assert!(log.verify());
        assert_eq!(log.next_id(), 11);
    }

    #[test]
    fn without_chaining_stores_no_hashes_and_verifies_trivially() {
        let mut log = AuditLog::without_chaining();
        log.append(entry(1, "T-100", "checkout")).unwrap();
        log.append(entry(2, "T-100", "return")).unwrap();

        assert!(log.entries().iter().all(|e| e.entry_hash.is_none()));
        assert!(log.entries().iter().all(|e| e.previous_hash.is_none()));
        assert!(log.verify());
    }

    #[test]
    fn append_overrides_caller_supplied_hashes() {
        let mut log = AuditLog::new();
        let mut forged = entry(1, "T-100", "checkout");
        forged.previous_hash = Some("bogus".to_string());
        forged.entry_hash = Some("bogus".to_string());

        let stored = log.append(forged).unwrap();
        assert!(stored.previous_hash.is_none());
        assert_eq!(stored.entry_hash, Some(stored.compute_hash()));
    }

    #[test]
    fn load_rejects_unordered_entries() {
        let entries = vec![entry(2, "T-100", "checkout"), entry(1, "T-100", "return")];
        assert!(matches!(
            AuditLog::load(entries, true),
            Err(AuditError::CorruptEntries { id: 1, .. })
        ));
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(AuditLog::new().next_id(), 1);
    }
}
