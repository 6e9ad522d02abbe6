//! History entry domain entities
//!
//! A [`HistoryEntry`] records one completed transfer: who performed it, when,
//! which local file, which remote object and in which direction. Entries are
//! only ever appended to the ledger, never edited.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{FileName, RemoteId};

/// Environment variables consulted, in order, to identify the actor
pub const ACTOR_ENV_VARS: &[&str] = &["USER", "USERNAME"];

/// Actor recorded when no identity can be found in the environment
pub const UNKNOWN_ACTOR: &str = "unknown";

/// Direction of a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferAction {
    /// Local file was uploaded to the remote folder
    Upload,
    /// Remote file was downloaded into the sync root
    Download,
}

impl TransferAction {
    /// Past-tense verb used when displaying history (`uploaded`, `downloaded`)
    pub fn past_tense(&self) -> &'static str {
        match self {
            TransferAction::Upload => "uploaded",
            TransferAction::Download => "downloaded",
        }
    }
}

impl fmt::Display for TransferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferAction::Upload => "upload",
            TransferAction::Download => "download",
        };
        write!(f, "{}", s)
    }
}

/// Identity of whoever ran the transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates an actor from an explicit identity string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resolves the actor from the process environment
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolves the actor through `lookup`, trying each of [`ACTOR_ENV_VARS`]
    /// in order. Empty values are skipped; falls back to [`UNKNOWN_ACTOR`].
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ACTOR_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .map(Self)
            .unwrap_or_else(|| Self(UNKNOWN_ACTOR.to_string()))
    }

    /// Get the inner string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record in the history ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Who performed the transfer
    #[serde(alias = "user")]
    actor: Actor,
    /// When the transfer completed
    timestamp: DateTime<Utc>,
    /// Local base name of the transferred file
    file: String,
    /// Identifier of the remote object
    #[serde(alias = "driveId")]
    remote_id: RemoteId,
    /// Transfer direction
    action: TransferAction,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time
    ///
    /// # Example
    ///
    /// ```
    /// use drivesync_core::domain::{Actor, FileName, HistoryEntry, RemoteId, TransferAction};
    ///
    /// let entry = HistoryEntry::new(
    ///     Actor::new("ana"),
    ///     &FileName::new("notes.md".to_string()).unwrap(),
    ///     RemoteId::new("abc123".to_string()).unwrap(),
    ///     TransferAction::Upload,
    /// );
    /// assert_eq!(entry.file(), "notes.md");
    /// ```
    pub fn new(actor: Actor, file: &FileName, remote_id: RemoteId, action: TransferAction) -> Self {
        Self {
            actor,
            timestamp: Utc::now(),
            file: file.as_str().to_string(),
            remote_id,
            action,
        }
    }

    /// Overrides the completion time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn remote_id(&self) -> &RemoteId {
        &self.remote_id
    }

    pub fn action(&self) -> TransferAction {
        self.action
    }

    /// Single-line description: `[timestamp] actor uploaded file -> remoteId`
    pub fn describe(&self) -> String {
        format!(
            "[{}] {} {} {} -> {}",
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.actor,
            self.action.past_tense(),
            self.file,
            self.remote_id
        )
    }
}
