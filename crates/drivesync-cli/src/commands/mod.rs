//! Subcommands and the shared wiring they run on
//!
//! Every command receives an [`AppContext`]: the loaded configuration with
//! command-line overrides applied and the resolved sync root. Commands that
//! talk to Drive build a [`SyncEngine`] from it.

pub mod history;
pub mod init;
pub mod pull;
pub mod push;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use drivesync_core::config::Config;
use drivesync_core::domain::Actor;
use drivesync_drive::auth::{ClientCredentials, StoredToken, TokenRefresher, TokenSession};
use drivesync_drive::client::DriveClient;
use drivesync_drive::provider::DriveRemoteStore;
use drivesync_drive::DriveError;
use drivesync_history::{HistoryLogger, JsonHistoryLedger};
use drivesync_sync::engine::SyncEngine;
use drivesync_sync::filesystem::LocalFolder;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub folder: Option<String>,
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    config_path: PathBuf,
    root: PathBuf,
}

impl AppContext {
    /// Loads the configuration file and applies `options` on top
    ///
    /// # Errors
    /// Fails when the resulting configuration does not validate.
    pub fn load(options: &GlobalOptions) -> Result<Self> {
        let config_path = options.config.clone().unwrap_or_else(Config::default_path);
        let config = Config::load_or_default(&config_path);
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::from_config(config, config_path, options, &cwd)
    }

    fn from_config(
        mut config: Config,
        config_path: PathBuf,
        options: &GlobalOptions,
        cwd: &Path,
    ) -> Result<Self> {
        if let Some(root) = &options.root {
            config.sync.root = Some(root.clone());
        }
        if let Some(folder) = &options.folder {
            config.remote.folder_name = folder.clone();
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("Invalid configuration: {}", rendered.join("; "));
        }

        let root = config.resolve_root(cwd);
        debug!(config = %config_path.display(), root = %root.display(), "Resolved context");
        Ok(Self {
            config,
            config_path,
            root,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The sync root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_ledger(&self) -> JsonHistoryLedger {
        JsonHistoryLedger::new(self.config.history_path(&self.root))
    }

    /// Refresher built from the configured client credentials, if usable
    pub fn token_refresher(&self) -> Result<Option<TokenRefresher>> {
        match ClientCredentials::load(&self.config.credentials_path()) {
            Ok(credentials) => Ok(Some(TokenRefresher::new(
                &credentials,
                &self.config.auth.token_url,
            )?)),
            Err(DriveError::CredentialsMissing(path)) => {
                debug!(path = %path.display(), "No client credentials, token refresh disabled");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh disabled");
                Ok(None)
            }
        }
    }

    /// Loads the token, refreshing it first if it has expired
    pub async fn token_session(&self) -> Result<TokenSession> {
        let token_path = self.config.token_path();
        let token = StoredToken::load(&token_path)?;

        let mut session = TokenSession::new(token_path, token, self.token_refresher()?);
        session
            .ensure_fresh()
            .await
            .context("Failed to refresh the expired access token")?;
        Ok(session)
    }

    /// Wires Drive, the ledger and the root into an engine
    pub async fn build_engine(&self) -> Result<SyncEngine> {
        let session = self.token_session().await?;

        let client =
            DriveClient::from_config(&self.config.remote, session.token().access_token.clone());
        let remote_store = Arc::new(DriveRemoteStore::new(client).with_session(session));

        let actor = Actor::from_env();
        let history = HistoryLogger::new(Arc::new(self.history_ledger()), actor);
        let local = LocalFolder::new(self.root.clone(), self.config.sync.ignore.clone());

        info!(
            root = %self.root.display(),
            folder = %self.config.remote.folder_name,
            "Engine ready"
        );
        Ok(SyncEngine::new(
            remote_store,
            history,
            local,
            self.config.remote.folder_name.clone(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Context rooted at `dir`, with token and credentials paths inside it
    pub(crate) fn context_in(dir: &Path) -> AppContext {
        let mut config = Config::default();
        config.auth.token_path = Some(dir.join("token.json"));
        config.auth.credentials_path = Some(dir.join("credentials.json"));
        AppContext::from_config(
            config,
            dir.join("config.yaml"),
            &GlobalOptions::default(),
            dir,
        )
        .unwrap()
    }
}
