// store.rs — Durable persistence behind the in-memory ledger.
//
// The ledger owns sequencing and hashing; a store only persists entries it
// is handed, already chained. JsonlStore writes one JSON object per line,
// append-only: easy to inspect with standard tools (jq, grep) and safe to
// tail. Tampering with the file is caught when the rehydrated ledger is
// verified, not by the store itself.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::entry::AuditEntry;
use crate::error::AuditError;

/// Append-only durable persistence for audit entries.
///
/// Implementations must never rewrite previously persisted entries.
pub trait AuditStore {
    /// Persist one entry. Called after the ledger has accepted it.
    fn persist(&mut self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// Load every persisted entry, oldest first.
    fn load_all(&self) -> Result<Vec<AuditEntry>, AuditError>;
}

/// An [`AuditStore`] backed by a JSONL file.
pub struct JsonlStore {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl JsonlStore {
    /// Open (or create) a store at the given path.
    ///
    /// The file is opened in append mode, so existing entries can never be
    /// overwritten through this handle.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStore for JsonlStore {
    fn persist(&mut self, entry: &AuditEntry) -> Result<(), AuditError> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.writer, "{}", json)?;
        // Flush per entry: an audit record that only exists in a buffer is
        // not an audit record.
        self.writer.flush()?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let file = File::open(&self.path).map_err(|source| AuditError::OpenFailed {
            path: self.path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
