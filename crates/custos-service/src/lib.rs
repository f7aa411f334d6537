//! # custos-service
//!
//! Integration layer over the custody core: an in-memory tool/user
//! directory, the hash-chained audit ledger, and the operations a REST or
//! CLI boundary would call — `checkout`, `return_tool`,
//! `is_calibration_valid`, `append_audit_entry`, `verify_audit_log`,
//! `export_audit_csv`, plus a snapshot/restore dump.
//!
//! This crate closes the two shared-mutation hazards the pure core leaves
//! to its caller: the tool table lock is held across the whole
//! read-check-write custody sequence (no two callers can both observe a
//! tool as available), and the ledger lock serializes appends into one
//! global total order so the hash chain never forks.

pub mod error;
pub mod service;
pub mod snapshot;

pub use error::ServiceError;
pub use service::{CustodyService, ServicePolicy};
pub use snapshot::Snapshot;
