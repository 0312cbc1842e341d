//! Session identity: the locally stored display name.
//!
//! The identity is read once at startup and injected into the controller and
//! cards by value; nothing performs ambient lookups against the store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Minimum length of a trimmed username at the entry gate.
pub const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("username must be at least {MIN_USERNAME_LEN} characters long")]
    UsernameTooShort,
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The current session's identity. No authentication is attached; the name
/// only gates which posts expose edit/delete controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

impl Session {
    /// Build a session from an entry-gate submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is shorter than
    /// [`MIN_USERNAME_LEN`].
    pub fn new(username: &str) -> Result<Self, SessionError> {
        let trimmed = username.trim();
        if trimmed.chars().count() < MIN_USERNAME_LEN {
            return Err(SessionError::UsernameTooShort);
        }
        Ok(Self {
            username: trimmed.to_string(),
        })
    }
}

/// File-backed session store: a single JSON document holding the username,
/// persisted across runs with no expiry.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let session: Session =
            serde_json::from_slice(&raw).map_err(|e| SessionError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;
        debug!(username = %session.username, "Loaded stored session");
        Ok(Some(session))
    }

    /// Persist the session, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let write_err = |source| SessionError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let body = serde_json::to_vec_pretty(session).expect("session always serializes");
        tokio::fs::write(&self.path, body).await.map_err(write_err)?;
        debug!(username = %session.username, path = %self.path.display(), "Saved session");
        Ok(())
    }
}
