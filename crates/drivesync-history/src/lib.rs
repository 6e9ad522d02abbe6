//! drivesync History - Transfer ledger and history logging
//!
//! Provides:
//! - `JsonHistoryLedger`: `IHistoryLedger` backed by a JSON array on disk
//! - `HistoryLogger`: non-fatal recording of completed uploads and downloads

pub mod ledger;
pub mod logger;

pub use ledger::{HistoryError, JsonHistoryLedger};
pub use logger::HistoryLogger;
