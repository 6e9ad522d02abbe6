//! drivesync Drive - Google Drive v3 client
//!
//! Provides an async client for:
//! - Loading the OAuth token produced by the external authorization flow
//!   and refreshing it with the client credentials
//! - Folder lookup/creation and child listing via `files.list`
//! - Multipart uploads and streamed downloads
//!
//! ## Modules
//!
//! - [`auth`] - Token file loading, refresh and persistence
//! - [`client`] - Authenticated HTTP client and status classification
//! - [`files`] - Drive `files` endpoint operations
//! - [`provider`] - [`IRemoteStore`](drivesync_core::ports::IRemoteStore) adapter

pub mod auth;
pub mod client;
pub mod files;
pub mod provider;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// No token file exists; the authorization flow has not been run
    #[error("Token not found at {}. Run the init flow to authorize.", .0.display())]
    TokenMissing(PathBuf),

    /// The token file exists but could not be read or decoded
    #[error("Invalid token file {}: {message}", .path.display())]
    InvalidToken {
        /// Path of the token file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// The refreshed token could not be written back
    #[error("Failed to save token to {}: {source}", .path.display())]
    TokenSave {
        /// Path of the token file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// No OAuth client credentials file exists
    #[error("OAuth client credentials not found at {}", .0.display())]
    CredentialsMissing(PathBuf),

    /// The credentials file exists but could not be used
    #[error("Invalid credentials file {}: {message}", .path.display())]
    InvalidCredentials {
        /// Path of the credentials file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// The token endpoint refused to issue a new access token
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Option<Duration>,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {body}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: StatusCode, body: String, retry_after: Option<Duration>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => DriveError::Unauthorized(body),
            StatusCode::FORBIDDEN => DriveError::Forbidden(body),
            StatusCode::NOT_FOUND => DriveError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests { retry_after },
            s if s.is_server_error() => DriveError::ServerError {
                status: s.as_u16(),
                body,
            },
            s => DriveError::UnexpectedStatus {
                status: s.as_u16(),
                body,
            },
        }
    }

    /// Whether re-running the authorization flow could fix this error
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            DriveError::TokenMissing(_)
                | DriveError::InvalidToken { .. }
                | DriveError::Unauthorized(_)
                | DriveError::RefreshFailed(_)
        )
    }
}
