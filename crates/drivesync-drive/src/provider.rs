//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Adapter over [`DriveClient`]: converts Drive resources into port DTOs and
//! [`DriveError`]s into `anyhow` errors with operation context attached.
//!
//! When a [`TokenSession`] is attached, a request rejected with 401 triggers
//! one token refresh and is then retried once with the new access token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use drivesync_core::domain::newtypes::{FileName, RemoteId};
use drivesync_core::ports::{IRemoteStore, RemoteEntry};

use crate::auth::TokenSession;
use crate::client::DriveClient;
use crate::files::DriveFile;
use crate::DriveError;

/// Google Drive backed remote store
#[derive(Debug)]
pub struct DriveRemoteStore {
    client: RwLock<DriveClient>,
    session: Option<Mutex<TokenSession>>,
}

impl DriveRemoteStore {
    /// Wraps an authenticated client
    pub fn new(client: DriveClient) -> Self {
        Self {
            client: RwLock::new(client),
            session: None,
        }
    }

    /// Attaches the token session used to recover from 401 responses
    pub fn with_session(mut self, session: TokenSession) -> Self {
        self.session = Some(Mutex::new(session));
        self
    }

    async fn client(&self) -> DriveClient {
        self.client.read().await.clone()
    }

    /// Refreshes the token after a 401, returning whether to retry
    async fn refresh_after<T>(&self, result: &Result<T, DriveError>) -> Result<bool> {
        let Err(DriveError::Unauthorized(_)) = result else {
            return Ok(false);
        };
        let Some(session) = &self.session else {
            return Ok(false);
        };

        let mut session = session.lock().await;
        if !session.can_refresh() {
            return Ok(false);
        }
        info!("Drive rejected the access token, refreshing");
        let access_token = session
            .refresh()
            .await
            .context("Failed to refresh access token")?;
        self.client.write().await.set_access_token(access_token);
        Ok(true)
    }
}

fn to_entry(file: DriveFile) -> Result<RemoteEntry> {
    let id = file.remote_id()?;
    let is_folder = file.is_folder();
    Ok(RemoteEntry {
        id,
        name: file.name.unwrap_or_default(),
        is_folder,
    })
}

#[async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn find_folders(&self, name: &str) -> Result<Vec<RemoteEntry>> {
        let mut result = self.client().await.find_folders(name).await;
        if self.refresh_after(&result).await? {
            result = self.client().await.find_folders(name).await;
        }
        let files = result.with_context(|| format!("Failed to search for folder '{name}'"))?;
        files.into_iter().map(to_entry).collect()
    }

    async fn create_folder(&self, name: &str) -> Result<RemoteId> {
        let mut result = self.client().await.create_folder(name).await;
        if self.refresh_after(&result).await? {
            result = self.client().await.create_folder(name).await;
        }
        result.with_context(|| format!("Failed to create folder '{name}'"))
    }

    async fn list_children(&self, folder_id: &RemoteId) -> Result<Vec<RemoteEntry>> {
        let mut result = self.client().await.list_children(folder_id).await;
        if self.refresh_after(&result).await? {
            result = self.client().await.list_children(folder_id).await;
        }
        let files = result.with_context(|| format!("Failed to list folder {folder_id}"))?;
        debug!(folder = %folder_id, count = files.len(), "Listed remote folder");
        files.into_iter().map(to_entry).collect()
    }

    async fn upload_file(
        &self,
        folder_id: &RemoteId,
        name: &FileName,
        data: Vec<u8>,
    ) -> Result<RemoteId> {
        let mut result = self.client().await.upload_multipart(folder_id, name, &data).await;
        if self.refresh_after(&result).await? {
            result = self.client().await.upload_multipart(folder_id, name, &data).await;
        }
        let uploaded = result.with_context(|| format!("Failed to upload {name}"))?;
        Ok(uploaded.remote_id()?)
    }

    async fn download_file(
        &self,
        file_id: &RemoteId,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        // A 401 arrives before any byte is written, so retrying into the
        // same writer is safe
        let mut result = self.client().await.download_to(file_id, &mut *dest).await;
        if self.refresh_after(&result).await? {
            result = self.client().await.download_to(file_id, &mut *dest).await;
        }
        result.with_context(|| format!("Failed to download {file_id}"))
    }
}
