//! Validated newtypes for domain identifiers
//!
//! - [`RemoteId`] - opaque identifier assigned by the remote store
//! - [`FileName`] - a single path component, safe to join onto the sync root

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Identifier of a file or folder in the remote store
///
/// The store owns the format; the only rules enforced here are the ones
/// needed to embed the id in a request path: non-empty, no whitespace and no
/// `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains characters that cannot
    /// appear in a request path segment
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(|c| c.is_whitespace() || c == '/' || c == '?') {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

/// A bare file name with no directory components
///
/// Remote names are joined onto the sync root during pull, so anything that
/// could escape the root (`..`, separators, NUL) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Create a new FileName
    ///
    /// # Errors
    /// Returns error if the name is empty, `.`/`..`, or contains `/`, `\` or NUL
    pub fn new(name: String) -> Result<Self, DomainError> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(DomainError::InvalidFileName(name));
        }

        if name.contains(['/', '\\', '\0']) {
            return Err(DomainError::InvalidFileName(name));
        }

        Ok(Self(name))
    }

    /// Extracts the base name of a local path
    ///
    /// # Errors
    /// Returns error if the path has no final component (e.g. `/` or `..`)
    /// or the component is not valid UTF-8
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::InvalidFileName(path.display().to_string()))?;
        Self::new(name.to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a hidden (dot-prefixed) entry
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.0.starts_with('.')
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for FileName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

impl AsRef<Path> for FileName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}
