//! History ledger port (driven/secondary port)
//!
//! The ledger is an ordered, append-only sequence of [`HistoryEntry`]
//! records. Implementations must preserve insertion order and must treat a
//! corrupt or wrongly-shaped document as an empty ledger rather than an
//! error.

use crate::domain::HistoryEntry;

/// Port trait for the transfer history ledger
#[async_trait::async_trait]
pub trait IHistoryLedger: Send + Sync {
    /// Appends an entry to the end of the ledger
    async fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()>;

    /// Returns every entry in insertion order
    ///
    /// A missing or unreadable-as-sequence document yields an empty vector.
    /// Only genuine I/O failures (e.g. permission denied) are errors.
    async fn read_all(&self) -> anyhow::Result<Vec<HistoryEntry>>;
}
