//! HistoryLogger - records completed transfers in the ledger
//!
//! Wraps [`IHistoryLedger::append`] with one method per transfer direction.
//! All methods are non-fatal: a failed append is logged via `tracing::warn!`
//! and never aborts the transfer batch that triggered it.

use std::sync::Arc;

use drivesync_core::{
    domain::{Actor, FileName, HistoryEntry, RemoteId, TransferAction},
    ports::IHistoryLedger,
};

/// High-level history recorder bound to a single actor.
pub struct HistoryLogger {
    ledger: Arc<dyn IHistoryLedger>,
    actor: Actor,
}

impl HistoryLogger {
    /// Creates a logger that stamps every entry with `actor`.
    pub fn new(ledger: Arc<dyn IHistoryLedger>, actor: Actor) -> Self {
        Self { ledger, actor }
    }

    /// Persist an entry, swallowing errors with a tracing warning.
    ///
    /// Returns whether the entry reached the ledger.
    async fn save(&self, entry: &HistoryEntry) -> bool {
        match self.ledger.append(entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, file = entry.file(), "Failed to save history entry");
                false
            }
        }
    }

    /// Log a completed upload.
    pub async fn log_upload(&self, file: &FileName, remote_id: &RemoteId) -> bool {
        let entry = HistoryEntry::new(
            self.actor.clone(),
            file,
            remote_id.clone(),
            TransferAction::Upload,
        );
        self.save(&entry).await
    }

    /// Log a completed download.
    pub async fn log_download(&self, file: &FileName, remote_id: &RemoteId) -> bool {
        let entry = HistoryEntry::new(
            self.actor.clone(),
            file,
            remote_id.clone(),
            TransferAction::Download,
        );
        self.save(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// In-memory ledger that records appended entries
    struct MockLedger {
        entries: Mutex<Vec<HistoryEntry>>,
        fail: bool,
    }

    impl MockLedger {
        fn new(fail: bool) -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl IHistoryLedger for MockLedger {
        async fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn read_all(&self) -> anyhow::Result<Vec<HistoryEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    fn name(s: &str) -> FileName {
        FileName::new(s.to_string()).unwrap()
    }

    fn id(s: &str) -> RemoteId {
        RemoteId::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_log_upload() {
        let ledger = Arc::new(MockLedger::new(false));
        let logger = HistoryLogger::new(ledger.clone(), Actor::new("ana"));

        assert!(logger.log_upload(&name("a.txt"), &id("r1")).await);

        let entries = ledger.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action(), TransferAction::Upload);
        assert_eq!(entries[0].actor().as_str(), "ana");
        assert_eq!(entries[0].file(), "a.txt");
        assert_eq!(entries[0].remote_id().as_str(), "r1");
    }

    #[tokio::test]
    async fn test_log_download() {
        let ledger = Arc::new(MockLedger::new(false));
        let logger = HistoryLogger::new(ledger.clone(), Actor::new("ana"));

        assert!(logger.log_download(&name("b.txt"), &id("r2")).await);

        let entries = ledger.read_all().await.unwrap();
        assert_eq!(entries[0].action(), TransferAction::Download);
    }

    #[tokio::test]
    async fn test_append_failure_is_swallowed() {
        let ledger = Arc::new(MockLedger::new(true));
        let logger = HistoryLogger::new(ledger.clone(), Actor::new("ana"));

        assert!(!logger.log_upload(&name("a.txt"), &id("r1")).await);
        assert!(ledger.read_all().await.unwrap().is_empty());
    }
}
