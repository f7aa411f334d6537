// error.rs — Error types for the audit subsystem.
//
// Uses `thiserror` to derive the standard Rust `Error` trait automatically.
// InvalidSequence is an integration/programming error in id assignment: it
// is fatal to the attempted append and must be logged loudly, but the log
// itself is left completely unmodified.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// An append used an id that does not extend the global sequence.
    #[error("audit id {attempted} does not extend the sequence (last id is {last_id})")]
    InvalidSequence { last_id: u64, attempted: u64 },

    /// A loaded entry set is not a well-formed chain (bad ordering or a
    /// hash that does not match its fields).
    #[error("audit entries failed rehydration at id {id}: {reason}")]
    CorruptEntries { id: u64, reason: String },

    /// Failed to open or create the backing store file.
    #[error("failed to open audit store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write an entry to the backing store.
    #[error("failed to persist audit entry: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// Failed to serialize or deserialize an entry (malformed JSON).
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
