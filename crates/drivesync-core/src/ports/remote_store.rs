//! Remote store port (driven/secondary port)
//!
//! This module defines the interface to the cloud object store that holds
//! the well-known sync folder. The Google Drive adapter lives in
//! `drivesync-drive`; tests use in-memory implementations.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Downloads are written into a caller-supplied [`AsyncWrite`] so content
//!   is streamed rather than buffered; the call returns once the stream has
//!   been fully written.

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;

use crate::domain::newtypes::{FileName, RemoteId};

/// A single child of a remote folder
///
/// Port-level DTO; the orchestrator decides what to do with folders versus
/// files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Store-assigned identifier
    pub id: RemoteId,
    /// Name as stored remotely (not yet validated as a local file name)
    pub name: String,
    /// Whether this entry is itself a folder
    pub is_folder: bool,
}

/// Port trait for remote object store operations
///
/// All methods assume an already-authenticated transport.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists folders whose name is exactly `name`, in store order
    async fn find_folders(&self, name: &str) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Creates a folder named `name` and returns its identifier
    async fn create_folder(&self, name: &str) -> anyhow::Result<RemoteId>;

    /// Lists every entry whose parent is `folder_id`
    async fn list_children(&self, folder_id: &RemoteId) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Creates a new file named `name` inside `folder_id` with `data` as content
    ///
    /// # Returns
    /// The identifier assigned to the new file
    async fn upload_file(
        &self,
        folder_id: &RemoteId,
        name: &FileName,
        data: Vec<u8>,
    ) -> anyhow::Result<RemoteId>;

    /// Streams the content of `file_id` into `dest`
    ///
    /// # Returns
    /// Number of bytes written
    async fn download_file(
        &self,
        file_id: &RemoteId,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<u64>;
}
