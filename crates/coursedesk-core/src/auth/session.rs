use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to access session file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted form of the session, stored like a cookie under `auth_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "auth_token")]
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String) -> Self {
        Self {
            token,
            created_at: Utc::now(),
        }
    }
}

/// Holder of the current bearer token.
///
/// Clones share the same slot, so the API client and the route guard see
/// the same state. Writes are expected from a single owner (the application
/// shell); readers take a short read lock at call time.
#[derive(Debug, Clone, Default)]
pub struct Session {
    cache_dir: Option<PathBuf>,
    data: Arc<RwLock<Option<SessionData>>>,
}

impl Session {
    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session persisted to `session.json` under `cache_dir`
    pub fn persistent(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            data: Arc::default(),
        }
    }

    /// Load session from disk. Returns whether a token was restored.
    pub fn load(&self) -> Result<bool, SessionError> {
        let Some(path) = self.session_path() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        let data: SessionData =
            serde_json::from_str(&contents).map_err(|source| SessionError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Restored session");
        *self.write() = Some(data);
        Ok(true)
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|d| d.token.clone())
    }

    /// Snapshot of the stored session record
    pub fn data(&self) -> Option<SessionData> {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Store a new token, replacing any previous one, and persist it.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let data = SessionData::new(token.into());
        if let Some(path) = self.session_path() {
            write_session_file(&path, &data)?;
        }
        *self.write() = Some(data);
        info!("Session token stored");
        Ok(())
    }

    /// Forget the token and remove the persisted copy.
    pub fn clear(&self) -> Result<(), SessionError> {
        *self.write() = None;
        if let Some(path) = self.session_path() {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|source| SessionError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        info!("Session cleared");
        Ok(())
    }

    fn session_path(&self) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(SESSION_FILE))
    }

    // A poisoned lock still holds a usable Option, so recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn write_session_file(path: &Path, data: &SessionData) -> Result<(), SessionError> {
    let io_err = |source: std::io::Error| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let contents = serde_json::to_string_pretty(data).map_err(|source| SessionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, contents).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_set_and_clear() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);

        session.set_token("abc").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.set_token("def").unwrap();
        assert_eq!(session.token().as_deref(), Some("def"));

        session.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::in_memory();
        let reader = session.clone();
        session.set_token("shared").unwrap();
        assert_eq!(reader.token().as_deref(), Some("shared"));
        session.clear().unwrap();
        assert_eq!(reader.token(), None);
    }

    #[test]
    fn test_persistent_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::persistent(dir.path());
        session.set_token("persisted-token").unwrap();

        let contents = std::fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        assert!(contents.contains("\"auth_token\": \"persisted-token\""));

        let reloaded = Session::persistent(dir.path());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.token().as_deref(), Some("persisted-token"));

        reloaded.clear().unwrap();
        assert!(!dir.path().join(SESSION_FILE).exists());
        assert!(!Session::persistent(dir.path()).load().unwrap());
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::persistent(dir.path().join("nested"));
        assert!(!session.load().unwrap());

        std::fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        let corrupt = Session::persistent(dir.path());
        assert!(matches!(corrupt.load(), Err(SessionError::Parse { .. })));
        assert!(!corrupt.is_authenticated());
    }

    #[test]
    fn test_in_memory_load_is_noop() {
        assert!(!Session::in_memory().load().unwrap());
    }
}
