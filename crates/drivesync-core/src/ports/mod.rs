//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the core depends on; implementations live in
//! adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote object store (Google Drive)
//! - [`IHistoryLedger`] - Local append-only transfer history

pub mod history_ledger;
pub mod remote_store;

pub use history_ledger::IHistoryLedger;
pub use remote_store::{IRemoteStore, RemoteEntry};
