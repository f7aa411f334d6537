//! # custos-audit
//!
//! Append-only, hash-chained audit ledger for custody actions.
//!
//! Every custody action is recorded as an [`AuditEntry`] in a single global
//! sequence with strictly increasing ids. Each entry carries a SHA-256 hash
//! over its own canonical fields plus the previous entry's hash, so any
//! retroactive edit, insertion, reordering, or deletion invalidates every
//! subsequent link and is caught by [`AuditLog::verify`].
//!
//! The ledger itself is in-memory (a contiguous growable array indexed by
//! sequence position); durable persistence goes through the [`AuditStore`]
//! trait, with a JSONL file implementation in [`JsonlStore`].
//!
//! ## Quick Example
//!
//! ```rust
//! use chrono::Utc;
//! use custos_audit::{AuditEntry, AuditLog};
//!
//! let mut log = AuditLog::new();
//! let entry = AuditEntry::new(1, "T-100", "checkout", "alice", Utc::now())
//!     .with_payload_entry("holder", "alice");
//! log.append(entry).unwrap();
//! assert!(log.verify());
//! ```

pub mod entry;
pub mod error;
pub mod export;
pub mod hasher;
pub mod ledger;
pub mod store;

// Re-export the main types at the crate root for convenience.
pub use entry::AuditEntry;
pub use error::AuditError;
pub use export::{export_audit_csv, ExportManifest};
pub use ledger::AuditLog;
pub use store::{AuditStore, JsonlStore};
