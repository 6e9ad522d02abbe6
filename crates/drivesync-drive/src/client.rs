//! Google Drive v3 HTTP client
//!
//! Wraps `reqwest::Client` with bearer authentication and the two base URLs
//! the Drive API uses: one for metadata calls and one for media uploads.
//! Endpoint-specific calls live in [`crate::files`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivesync_drive::client::DriveClient;
//!
//! # async fn example() -> Result<(), drivesync_drive::DriveError> {
//! let client = DriveClient::new("access-token-here");
//! let folders = client.find_folders("drive-sync").await?;
//! println!("{} matching folders", folders.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use drivesync_core::config::{RemoteConfig, DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL};
use reqwest::{header::RETRY_AFTER, Client, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::DriveError;

/// HTTP client for Google Drive API calls
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests (`.../drive/v3`)
    api_base_url: String,
    /// Base URL for media uploads (`.../upload/drive/v3`)
    upload_base_url: String,
    /// Current OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a client pointed at the public Google endpoints
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_urls(access_token, DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL)
    }

    /// Creates a client with custom base URLs (useful for testing)
    ///
    /// Trailing slashes are stripped so paths can always start with `/`.
    pub fn with_base_urls(
        access_token: impl Into<String>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base_url: trim_base(api_base_url.into()),
            upload_base_url: trim_base(upload_base_url.into()),
            access_token: access_token.into(),
        }
    }

    /// Creates a client from the `remote` configuration section
    pub fn from_config(config: &RemoteConfig, access_token: impl Into<String>) -> Self {
        Self::with_base_urls(
            access_token,
            config.api_base_url.clone(),
            config.upload_base_url.clone(),
        )
    }

    /// Updates the access token
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
        debug!("Updated DriveClient access token");
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Base URL used for metadata requests
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Base URL used for media uploads
    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Creates an authenticated request against the metadata API
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request against the upload API
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Sends `request` and converts any non-success status into a
    /// classified [`DriveError`]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        ensure_success(response).await
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Passes successful responses through and maps the rest to [`DriveError`]
pub async fn ensure_success(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();

    warn!(status = status.as_u16(), path = %url, "Drive API request failed");
    Err(DriveError::from_status(status, body, retry_after))
}

/// Parses a `Retry-After` header given in delta-seconds
///
/// HTTP-date values are not used by Drive and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
