//! Domain error types
//!
//! Validation failures for identifiers and file names, and the local-input
//! errors raised before any remote call is made.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Name is not a plain file name (empty, `.`/`..`, or contains a separator)
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// A file named on the command line does not exist locally
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
