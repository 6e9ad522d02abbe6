//! OAuth token file handling
//!
//! The interactive consent flow runs outside this tool and leaves a JSON
//! token file behind. This module reads that file, hands the access token to
//! [`DriveClient`](crate::client::DriveClient), and refreshes it with the
//! client registration from `credentials.json` once it expires or Drive
//! rejects it. A refreshed token is written back over the token file.
//!
//! Accepted token shape (extra fields are ignored):
//!
//! ```json
//! {
//!   "access_token": "ya29...",
//!   "refresh_token": "1//0g...",
//!   "scope": "https://www.googleapis.com/auth/drive.file",
//!   "token_type": "Bearer",
//!   "expiry_date": 1735689600000
//! }
//! ```
//!
//! ## Components
//!
//! - [`StoredToken`] - The token file contents
//! - [`ClientCredentials`] - OAuth client id/secret from `credentials.json`
//! - [`TokenRefresher`] - `refresh_token` grant against the token endpoint
//! - [`TokenSession`] - Current token plus the means to renew and persist it

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use oauth2::{
    basic::{BasicClient, BasicErrorResponse},
    AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken,
    RequestTokenError, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::DriveError;

/// OAuth scope the token is expected to carry
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Token as persisted by the authorization flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Bearer token for API requests
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Usually `Bearer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredToken {
    /// Loads the token file at `path`
    ///
    /// # Errors
    /// - [`DriveError::TokenMissing`] if the file does not exist
    /// - [`DriveError::InvalidToken`] if it cannot be read or decoded, or the
    ///   access token is empty
    pub fn load(path: &Path) -> Result<Self, DriveError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DriveError::TokenMissing(path.to_path_buf()))
            }
            Err(e) => {
                return Err(DriveError::InvalidToken {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let token: StoredToken =
            serde_json::from_str(&content).map_err(|e| DriveError::InvalidToken {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if token.access_token.trim().is_empty() {
            return Err(DriveError::InvalidToken {
                path: path.to_path_buf(),
                message: "access_token is empty".to_string(),
            });
        }

        if token.is_expired() {
            warn!(path = %path.display(), "Access token has expired");
        }

        debug!(path = %path.display(), has_refresh = token.refresh_token.is_some(), "Loaded token");
        Ok(token)
    }

    /// Writes the token to `path` through a `<name>.tmp` sibling and a rename
    pub async fn save(&self, path: &Path) -> Result<(), DriveError> {
        let save_err = |e: std::io::Error| DriveError::TokenSave {
            path: path.to_path_buf(),
            source: e,
        };
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| save_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, &json).await.map_err(save_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(save_err)?;
        debug!(path = %path.display(), "Saved token");
        Ok(())
    }

    /// Expiry instant, if recorded
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Returns true if the access token has a recorded expiry in the past
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }

    /// Whether the granted scopes include [`DRIVE_SCOPE`] (true when unknown)
    pub fn has_drive_scope(&self) -> bool {
        match &self.scope {
            Some(scope) => scope
                .split_whitespace()
                .any(|s| s == DRIVE_SCOPE || s == "https://www.googleapis.com/auth/drive"),
            None => true,
        }
    }

    fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

// ============================================================================
// ClientCredentials
// ============================================================================

/// OAuth client registration, as found under `installed` (desktop clients)
/// or `web` in a Google Cloud `credentials.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Token endpoint recorded in the file
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

impl ClientCredentials {
    /// Loads `credentials.json` from `path`
    ///
    /// # Errors
    /// - [`DriveError::CredentialsMissing`] if the file does not exist
    /// - [`DriveError::InvalidCredentials`] if it cannot be read, decoded, or
    ///   holds neither an `installed` nor a `web` client
    pub fn load(path: &Path) -> Result<Self, DriveError> {
        let invalid = |message: String| DriveError::InvalidCredentials {
            path: path.to_path_buf(),
            message,
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DriveError::CredentialsMissing(path.to_path_buf()))
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        let file: CredentialsFile =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        let credentials = file
            .installed
            .or(file.web)
            .ok_or_else(|| invalid("expected an `installed` or `web` client".to_string()))?;

        if credentials.client_id.trim().is_empty() {
            return Err(invalid("client_id is empty".to_string()));
        }
        Ok(credentials)
    }
}

// ============================================================================
// TokenRefresher
// ============================================================================

type RefreshClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Exchanges a refresh token for a new access token
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client: RefreshClient,
    http: reqwest::Client,
}

impl TokenRefresher {
    /// Creates a refresher for `credentials`
    ///
    /// The credentials' own `token_uri` wins over `default_token_url`.
    pub fn new(credentials: &ClientCredentials, default_token_url: &str) -> Result<Self, DriveError> {
        let token_url = credentials
            .token_uri
            .as_deref()
            .unwrap_or(default_token_url);
        let token_url = TokenUrl::new(token_url.to_string())
            .map_err(|e| DriveError::RefreshFailed(format!("invalid token URL '{token_url}': {e}")))?;

        let mut client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url);
        if let Some(secret) = &credentials.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        // The token endpoint must not be followed through redirects
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, http })
    }

    /// Requests a new access token for `token`
    ///
    /// The returned token keeps the old refresh token and scope when the
    /// endpoint does not send new ones. Without a reported lifetime the new
    /// token is assumed to last one hour.
    pub async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, DriveError> {
        let refresh_token = token.refresh_token().ok_or_else(|| {
            DriveError::RefreshFailed("the token file has no refresh_token".to_string())
        })?;

        info!("Refreshing access token");
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| DriveError::RefreshFailed(describe_refresh_error(e)))?;

        let expires_at = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| Utc::now() + d)
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let scope = response
            .scopes()
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .or_else(|| token.scope.clone());

        Ok(StoredToken {
            access_token: response.access_token().secret().to_string(),
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            scope,
            token_type: token.token_type.clone().or_else(|| Some("Bearer".to_string())),
            expiry_date: Some(expires_at.timestamp_millis()),
        })
    }
}

fn describe_refresh_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// TokenSession
// ============================================================================

/// The token in use, where it lives, and how to renew it
#[derive(Debug)]
pub struct TokenSession {
    path: PathBuf,
    token: StoredToken,
    refresher: Option<TokenRefresher>,
}

impl TokenSession {
    /// Creates a session for `token`, loaded from `path`
    ///
    /// Without a refresher the token is used as is until Drive rejects it.
    pub fn new(path: impl Into<PathBuf>, token: StoredToken, refresher: Option<TokenRefresher>) -> Self {
        Self {
            path: path.into(),
            token,
            refresher,
        }
    }

    /// The current token
    pub fn token(&self) -> &StoredToken {
        &self.token
    }

    /// Whether [`TokenSession::refresh`] can succeed at all
    pub fn can_refresh(&self) -> bool {
        self.refresher.is_some() && self.token.refresh_token().is_some()
    }

    /// Obtains a new access token, rewrites the token file and returns the
    /// new access token
    pub async fn refresh(&mut self) -> Result<String, DriveError> {
        let refresher = self.refresher.as_ref().ok_or_else(|| {
            DriveError::RefreshFailed("no OAuth client credentials are configured".to_string())
        })?;

        let fresh = refresher.refresh(&self.token).await?;
        fresh.save(&self.path).await?;
        self.token = fresh;

        info!(path = %self.path.display(), "Access token refreshed");
        Ok(self.token.access_token.clone())
    }

    /// Refreshes the token if it has expired and a refresh is possible
    ///
    /// Returns whether a refresh happened.
    pub async fn ensure_fresh(&mut self) -> Result<bool, DriveError> {
        if !self.token.is_expired() {
            return Ok(false);
        }
        if !self.can_refresh() {
            warn!("Access token has expired and cannot be refreshed");
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }
}
