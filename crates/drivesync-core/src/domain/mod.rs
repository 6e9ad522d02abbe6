//! Domain entities and business logic
//!
//! This module contains the core domain types for drivesync:
//! - Newtypes for remote identifiers and validated file names
//! - History entries recording completed transfers
//! - Domain-specific error types

pub mod errors;
pub mod history;
pub mod newtypes;

// Re-export commonly used types
pub use errors::DomainError;
pub use history::{Actor, HistoryEntry, TransferAction};
pub use newtypes::*;
