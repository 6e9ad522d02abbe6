//! Local sync root access
//!
//! [`LocalFolder`] is the engine's view of the directory being synced:
//! which entries are eligible for a bulk push, how relative paths resolve,
//! and where downloads land.
//!
//! Downloads are written to a hidden `.<name>.part` sibling and renamed over
//! the target only once complete, so a failed pull leaves the existing file
//! as it was.
//!
//! Eligibility is decided by name only. Entries starting with `.` and
//! entries named in the ignore list are skipped; everything else is returned
//! (directories included) and fails later when read.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use drivesync_core::domain::newtypes::FileName;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::SyncError;

/// The local directory being synced
#[derive(Debug, Clone)]
pub struct LocalFolder {
    root: PathBuf,
    ignore: HashSet<String>,
}

impl LocalFolder {
    /// Creates a view of `root` that skips names in `ignore` when listing
    pub fn new(root: impl Into<PathBuf>, ignore: impl IntoIterator<Item = String>) -> Self {
        Self {
            root: root.into(),
            ignore: ignore.into_iter().collect(),
        }
    }

    /// The sync root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `path` against the root unless it is already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Whether a root entry called `name` takes part in a bulk push
    pub fn is_eligible(&self, name: &str) -> bool {
        !name.starts_with('.') && !self.ignore.contains(name)
    }

    /// Lists eligible root entries, sorted by name
    ///
    /// # Errors
    /// [`SyncError::RootNotFound`] if the root is missing, or an I/O error
    /// while reading the directory.
    pub async fn eligible_entries(&self) -> Result<Vec<PathBuf>, SyncError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::RootNotFound(self.root.clone()))
            }
            Err(e) => return Err(SyncError::io(&self.root, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| SyncError::io(&self.root, e))?
        {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(name = ?raw, "Skipping entry with a non UTF-8 name");
                    continue;
                }
            };
            if self.is_eligible(&name) {
                names.push(name);
            } else {
                trace!(name = %name, "Skipping ineligible entry");
            }
        }
        names.sort();

        debug!(root = %self.root.display(), count = names.len(), "Listed eligible entries");
        Ok(names.into_iter().map(|n| self.root.join(n)).collect())
    }

    /// Reads the whole content of a regular file
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, SyncError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| SyncError::io(path, e))?;
        if !metadata.is_file() {
            return Err(SyncError::NotAFile(path.to_path_buf()));
        }
        tokio::fs::read(path).await.map_err(|e| SyncError::io(path, e))
    }

    /// Starts a download of `root/<name>` into a hidden part file
    ///
    /// The target is not touched until [`PendingDownload::commit`].
    pub async fn begin_download(&self, name: &FileName) -> Result<PendingDownload, SyncError> {
        let target = self.root.join(name);
        let part_path = self.root.join(format!(".{name}.part"));
        let file = tokio::fs::File::create(&part_path)
            .await
            .map_err(|e| SyncError::io(&part_path, e))?;
        Ok(PendingDownload {
            file,
            part_path,
            target,
        })
    }
}

/// A download in progress, written next to its target
#[derive(Debug)]
pub struct PendingDownload {
    file: tokio::fs::File,
    part_path: PathBuf,
    target: PathBuf,
}

impl PendingDownload {
    /// Writer receiving the downloaded bytes
    pub fn writer(&mut self) -> &mut tokio::fs::File {
        &mut self.file
    }

    /// Path of the part file
    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    /// Replaces the target with the downloaded content
    pub async fn commit(mut self) -> Result<PathBuf, SyncError> {
        self.file
            .flush()
            .await
            .map_err(|e| SyncError::io(&self.part_path, e))?;
        drop(self.file);
        tokio::fs::rename(&self.part_path, &self.target)
            .await
            .map_err(|e| SyncError::io(&self.target, e))?;
        Ok(self.target)
    }

    /// Removes the part file, leaving the target as it was
    pub async fn discard(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.part_path).await {
            warn!(path = %self.part_path.display(), error = %e, "Failed to remove partial download");
        }
    }
}
