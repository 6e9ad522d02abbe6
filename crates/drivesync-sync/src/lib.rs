//! drivesync Sync - Transfer orchestration
//!
//! Provides:
//! - Push of explicit files or the whole eligible root listing
//! - Pull of every file in the remote folder into the root
//! - History logging of each completed transfer
//!
//! ## Modules
//!
//! - [`engine`] - The push/pull orchestrator and its reports
//! - [`filesystem`] - Local root enumeration, reads and download targets

pub mod engine;
pub mod filesystem;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by local filesystem operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with the path it happened on
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sync root does not exist or is not a directory
    #[error("Sync root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The path exists but is not a regular file
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// A domain-level error propagated from drivesync-core
    #[error("Domain error: {0}")]
    DomainError(#[from] drivesync_core::domain::errors::DomainError),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
