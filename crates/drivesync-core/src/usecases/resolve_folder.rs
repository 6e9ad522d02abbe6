//! Remote folder resolution use case
//!
//! Looks up the well-known sync folder by name and creates it when it does
//! not exist yet. The folder id is never cached across invocations; every
//! push or pull resolves it again.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::newtypes::RemoteId;
use crate::ports::IRemoteStore;

/// Use case for resolving the target folder in the remote store
pub struct ResolveFolderUseCase {
    remote_store: Arc<dyn IRemoteStore>,
    folder_name: String,
}

impl ResolveFolderUseCase {
    /// Creates a resolver for the folder called `folder_name`
    pub fn new(remote_store: Arc<dyn IRemoteStore>, folder_name: impl Into<String>) -> Self {
        Self {
            remote_store,
            folder_name: folder_name.into(),
        }
    }

    /// The folder name this resolver targets
    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    /// Returns the id of the sync folder, creating it if absent
    ///
    /// When several folders share the name, the first one listed wins.
    ///
    /// # Errors
    ///
    /// Any transport error from listing or creating propagates unchanged.
    pub async fn execute(&self) -> Result<RemoteId> {
        let matches = self
            .remote_store
            .find_folders(&self.folder_name)
            .await
            .with_context(|| format!("Failed to look up remote folder '{}'", self.folder_name))?;

        if let Some(existing) = matches.into_iter().next() {
            debug!(folder = %self.folder_name, id = %existing.id, "Resolved existing remote folder");
            return Ok(existing.id);
        }

        let id = self
            .remote_store
            .create_folder(&self.folder_name)
            .await
            .with_context(|| format!("Failed to create remote folder '{}'", self.folder_name))?;

        info!(folder = %self.folder_name, id = %id, "Created remote folder");
        Ok(id)
    }
}
