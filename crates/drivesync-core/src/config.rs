//! Configuration module for drivesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default name of the well-known remote folder.
pub const DEFAULT_FOLDER_NAME: &str = "drive-sync";

/// Default file name of the history ledger, relative to the sync root.
pub const DEFAULT_HISTORY_FILE: &str = ".drive-history.json";

/// Google Drive v3 metadata endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive v3 media upload endpoint.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Google OAuth 2.0 token endpoint, used to refresh access tokens.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
    pub history: HistoryConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Local side of the synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory pushed from and pulled into. `None` means the directory the
    /// CLI was invoked from.
    pub root: Option<PathBuf>,
    /// Entry names skipped when pushing a whole directory (hidden entries are
    /// always skipped).
    pub ignore: Vec<String>,
}

/// Remote store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Name of the folder that acts as the sync root in the remote store.
    pub folder_name: String,
    /// Base URL for Drive metadata requests.
    pub api_base_url: String,
    /// Base URL for Drive media uploads.
    pub upload_base_url: String,
}

/// History ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Ledger file name, created inside the sync root.
    pub file_name: String,
}

/// Authorization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path to the OAuth token file. `None` uses [`AuthConfig::default_token_path`].
    pub token_path: Option<PathBuf>,
    /// Path to the OAuth client credentials (`credentials.json` as downloaded
    /// from the Google Cloud console). `None` uses
    /// [`AuthConfig::default_credentials_path`]. Without it, expired tokens
    /// cannot be refreshed.
    pub credentials_path: Option<PathBuf>,
    /// Token endpoint used when the credentials file names none.
    pub token_url: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                }
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// Sync root, falling back to `cwd` when none is configured.
    pub fn resolve_root(&self, cwd: &Path) -> PathBuf {
        match &self.sync.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        }
    }

    /// Location of the history ledger under `root`.
    pub fn history_path(&self, root: &Path) -> PathBuf {
        root.join(&self.history.file_name)
    }

    /// Location of the OAuth token file.
    pub fn token_path(&self) -> PathBuf {
        self.auth
            .token_path
            .clone()
            .unwrap_or_else(AuthConfig::default_token_path)
    }

    /// Location of the OAuth client credentials file.
    pub fn credentials_path(&self) -> PathBuf {
        self.auth
            .credentials_path
            .clone()
            .unwrap_or_else(AuthConfig::default_credentials_path)
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("drivesync")
}

impl AuthConfig {
    /// `$XDG_CONFIG_HOME/drivesync/token.json` on Linux.
    pub fn default_token_path() -> PathBuf {
        config_dir().join("token.json")
    }

    /// `$XDG_CONFIG_HOME/drivesync/credentials.json` on Linux.
    pub fn default_credentials_path() -> PathBuf {
        config_dir().join("credentials.json")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: None,
            ignore: vec!["node_modules".to_string()],
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: None,
            credentials_path: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"remote.folder_name"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if let Some(root) = &self.sync.root {
            if root.is_absolute() && !root.is_dir() {
                errors.push(ValidationError {
                    field: "sync.root".into(),
                    message: format!("directory does not exist: {}", root.display()),
                });
            }
        }

        // --- remote ---
        if self.remote.folder_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "remote.folder_name".into(),
                message: "must not be empty".into(),
            });
        }
        for (field, url) in [
            ("remote.api_base_url", &self.remote.api_base_url),
            ("remote.upload_base_url", &self.remote.upload_base_url),
            ("auth.token_url", &self.auth.token_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("must be an http(s) URL, got '{url}'"),
                });
            }
        }

        // --- history ---
        let file_name = &self.history.file_name;
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name == "."
            || file_name == ".."
        {
            errors.push(ValidationError {
                field: "history.file_name".into(),
                message: format!("must be a plain file name, got '{file_name}'"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use drivesync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_root(PathBuf::from("/home/user/project"))
///     .remote_folder_name("drive-sync-test")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_root(mut self, root: PathBuf) -> Self {
        self.config.sync.root = Some(root);
        self
    }

    pub fn sync_ignore(mut self, names: Vec<String>) -> Self {
        self.config.sync.ignore = names;
        self
    }

    // --- remote ---

    pub fn remote_folder_name(mut self, name: impl Into<String>) -> Self {
        self.config.remote.folder_name = name.into();
        self
    }

    pub fn remote_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.api_base_url = url.into();
        self
    }

    pub fn remote_upload_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.upload_base_url = url.into();
        self
    }

    // --- history ---

    pub fn history_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.history.file_name = name.into();
        self
    }

    // --- auth ---

    pub fn auth_token_path(mut self, path: PathBuf) -> Self {
        self.config.auth.token_path = Some(path);
        self
    }

    pub fn auth_credentials_path(mut self, path: PathBuf) -> Self {
        self.config.auth.credentials_path = Some(path);
        self
    }

    pub fn auth_token_url(mut self, url: impl Into<String>) -> Self {
        self.config.auth.token_url = url.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
