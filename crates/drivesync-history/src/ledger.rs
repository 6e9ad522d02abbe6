//! JSON file ledger
//!
//! Implements [`IHistoryLedger`] as a single JSON array stored in the sync
//! root. Every append reads the current document, pushes the new entry and
//! rewrites the file through a temporary sibling + rename so a crash never
//! leaves a half-written ledger behind.
//!
//! There is no locking: two concurrent invocations race and the last writer
//! wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use drivesync_core::{domain::HistoryEntry, ports::IHistoryLedger};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while reading or writing the ledger file
#[derive(Debug, Error)]
pub enum HistoryError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger could not be serialized.
    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HistoryError {
    HistoryError::Io {
        path: path.into(),
        source,
    }
}

/// Ledger stored as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonHistoryLedger {
    path: PathBuf,
}

impl JsonHistoryLedger {
    /// Creates a ledger backed by the file at `path` (created on first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        Ok(parse_ledger(&self.path, &bytes))
    }

    async fn store(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(entries)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| io_err(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

/// Decodes a ledger document, treating anything that is not a JSON array of
/// entries as an empty ledger.
fn parse_ledger(path: &Path, bytes: &[u8]) -> Vec<HistoryEntry> {
    match serde_json::from_slice::<Vec<HistoryEntry>>(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Discarding unreadable history ledger");
            Vec::new()
        }
    }
}

#[async_trait::async_trait]
impl IHistoryLedger for JsonHistoryLedger {
    async fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        let mut entries = self.load().await?;
        entries.push(entry.clone());
        self.store(&entries).await?;
        debug!(
            path = %self.path.display(),
            total = entries.len(),
            action = %entry.action(),
            file = entry.file(),
            "Appended history entry"
        );
        Ok(())
    }

    async fn read_all(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        Ok(self.load().await?)
    }
}
