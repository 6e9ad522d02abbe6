//! Push/pull transfer engine
//!
//! The [`SyncEngine`] moves whole files between the local root and the
//! remote sync folder and records every completed transfer in the history
//! ledger.
//!
//! ## Transfer Flow
//!
//! 1. **Push**: check explicit paths (or list the root), resolve the folder,
//!    upload files one at a time. A failing file is reported and the batch
//!    moves on.
//! 2. **Pull**: resolve the folder, list its children, stream each file into
//!    the root one at a time. The first failure aborts the batch.
//!
//! Nothing is compared or deduplicated: every push creates new remote files
//! and every pull overwrites local ones once a download completes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use drivesync_core::domain::errors::DomainError;
use drivesync_core::domain::newtypes::{FileName, RemoteId};
use drivesync_core::ports::IRemoteStore;
use drivesync_core::usecases::ResolveFolderUseCase;
use drivesync_history::HistoryLogger;

use crate::filesystem::LocalFolder;
use crate::SyncError;

// ============================================================================
// Reports
// ============================================================================

/// One completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// Local base name
    pub file: String,
    /// Remote identifier of the file
    pub remote_id: RemoteId,
    /// Bytes moved
    pub bytes: u64,
}

/// A push that did not complete
#[derive(Debug, Clone, Serialize)]
pub struct TransferFailure {
    /// Local path that was attempted
    pub path: PathBuf,
    /// Rendered error chain
    pub error: String,
}

/// Outcome of [`SyncEngine::push`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushReport {
    /// Files uploaded, in attempt order
    pub uploaded: Vec<TransferRecord>,
    /// Files that failed, in attempt order
    pub failed: Vec<TransferFailure>,
}

impl PushReport {
    /// Number of files attempted
    pub fn attempted(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    /// True when every attempted file was uploaded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`SyncEngine::pull`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullReport {
    /// Files downloaded, in listing order
    pub downloaded: Vec<TransferRecord>,
    /// Names of remote sub-folders that were not pulled
    pub skipped: Vec<String>,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Orchestrates transfers between the local root and the remote folder
pub struct SyncEngine {
    remote_store: Arc<dyn IRemoteStore>,
    resolver: ResolveFolderUseCase,
    history: HistoryLogger,
    local: LocalFolder,
}

impl SyncEngine {
    /// Creates an engine targeting the remote folder called `folder_name`
    pub fn new(
        remote_store: Arc<dyn IRemoteStore>,
        history: HistoryLogger,
        local: LocalFolder,
        folder_name: impl Into<String>,
    ) -> Self {
        let resolver = ResolveFolderUseCase::new(Arc::clone(&remote_store), folder_name);
        Self {
            remote_store,
            resolver,
            history,
            local,
        }
    }

    /// Name of the remote folder this engine targets
    pub fn folder_name(&self) -> &str {
        self.resolver.folder_name()
    }

    /// Uploads `paths`, or every eligible root entry when `paths` is empty
    ///
    /// # Errors
    ///
    /// - [`DomainError::FileNotFound`] if an explicit path does not exist;
    ///   no remote call is made in that case
    /// - listing the root or resolving the folder fails
    ///
    /// Failures of individual files are reported in [`PushReport::failed`].
    pub async fn push(&self, paths: &[PathBuf]) -> Result<PushReport> {
        let targets = if paths.is_empty() {
            self.local
                .eligible_entries()
                .await
                .context("Failed to list sync root")?
        } else {
            self.check_explicit(paths).await?
        };

        let folder_id = self.resolver.execute().await?;
        info!(folder = %folder_id, files = targets.len(), "Starting push");

        let mut report = PushReport::default();
        for path in targets {
            match self.push_one(&folder_id, &path).await {
                Ok(record) => {
                    info!(file = %record.file, id = %record.remote_id, "Uploaded");
                    report.uploaded.push(record);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %format!("{e:#}"), "Upload failed");
                    report.failed.push(TransferFailure {
                        path,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Push finished"
        );
        Ok(report)
    }

    async fn check_explicit(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut resolved = Vec::with_capacity(paths.len());
        for path in paths {
            let full = self.local.resolve(path);
            let exists = tokio::fs::try_exists(&full)
                .await
                .map_err(|e| SyncError::io(&full, e))?;
            if !exists {
                return Err(DomainError::FileNotFound(full).into());
            }
            resolved.push(full);
        }
        Ok(resolved)
    }

    async fn push_one(&self, folder_id: &RemoteId, path: &Path) -> Result<TransferRecord> {
        let name = FileName::from_path(path)?;
        let data = self.local.read(path).await?;
        let bytes = data.len() as u64;

        let remote_id = self
            .remote_store
            .upload_file(folder_id, &name, data)
            .await?;

        self.history.log_upload(&name, &remote_id).await;

        Ok(TransferRecord {
            file: name.to_string(),
            remote_id,
            bytes,
        })
    }

    /// Downloads every file in the remote folder into the root
    ///
    /// Existing local files with the same name are overwritten. Remote
    /// sub-folders are skipped.
    ///
    /// # Errors
    ///
    /// The first failing file aborts the batch; files already pulled stay
    /// on disk and in the ledger.
    pub async fn pull(&self) -> Result<PullReport> {
        let folder_id = self.resolver.execute().await?;
        let children = self
            .remote_store
            .list_children(&folder_id)
            .await
            .context("Failed to list remote folder")?;
        info!(folder = %folder_id, entries = children.len(), "Starting pull");

        let mut report = PullReport::default();
        for entry in children {
            if entry.is_folder {
                warn!(name = %entry.name, id = %entry.id, "Skipping remote sub-folder");
                report.skipped.push(entry.name);
                continue;
            }

            let name = FileName::new(entry.name.clone()).with_context(|| {
                format!("Refusing to download remote file with unsafe name '{}'", entry.name)
            })?;

            let mut pending = self.local.begin_download(&name).await?;
            let bytes = match self
                .remote_store
                .download_file(&entry.id, pending.writer())
                .await
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    pending.discard().await;
                    return Err(e.context(format!("Failed to pull {name}")));
                }
            };
            pending.commit().await?;

            debug!(file = %name, bytes, "Downloaded");
            self.history.log_download(&name, &entry.id).await;

            report.downloaded.push(TransferRecord {
                file: name.to_string(),
                remote_id: entry.id,
                bytes,
            });
        }

        info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            "Pull finished"
        );
        Ok(report)
    }
}
