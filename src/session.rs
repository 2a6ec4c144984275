//! Persisted user session.
//!
//! The session is a user record plus an authorization token. Views never read
//! it from ambient storage; they receive a [`SessionStore`] and read it once at
//! mount. Clearing happens when the backend reports the session as expired.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// The signed-in user as stored alongside the token.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// Any other user fields the login flow stored, kept opaque.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A user identity plus the token the backend expects in `Authorization`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub user: UserRecord,
    pub token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: UserRecord::new(user_id),
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Storage backing the session.
///
/// Methods take `&self`; implementations synchronize internally so a view can
/// clear the session from inside concurrently running fetch completions.
pub trait SessionStore {
    /// The current session, or `None` when no user is signed in.
    fn load(&self) -> Option<Session>;

    /// Replace the stored session.
    fn save(&self, session: &Session) -> Result<()>;

    /// Remove both the token and the user record.
    fn clear(&self) -> Result<()>;
}

/// Session held in process memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.inner.lock().ok().and_then(|s| s.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Ok(mut s) = self.inner.lock() {
            *s = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut s) = self.inner.lock() {
            *s = None;
        }
        Ok(())
    }
}

/// Session persisted as a JSON file, surviving between runs.
///
/// A missing or unreadable file means "no session"; the store never fails a
/// read, it logs and reports absence instead.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> Option<Session> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "No session file");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Session file is corrupt; treating as signed out");
                None
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        info!(user_id = %session.user_id(), "Saved session");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = MemorySessionStore::default();
        assert!(store.load().is_none());

        store.save(&Session::new("u1", "tok")).unwrap();
        assert_eq!(store.load().unwrap().user_id(), "u1");

        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path)
            .save(&Session::new("u42", "secret"))
            .unwrap();

        let loaded = FileSessionStore::new(&path).load().unwrap();
        assert_eq!(loaded.user_id(), "u42");
        assert_eq!(loaded.token, "secret");
    }

    #[test]
    fn test_file_store_keeps_extra_user_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"user": {"_id": "u1", "email": "a@b.c"}, "token": "t"}"#,
        )
        .unwrap();

        let session = FileSessionStore::new(&path).load().unwrap();
        assert_eq!(session.user.extra["email"], "a@b.c");
    }

    #[test]
    fn test_file_store_missing_or_corrupt_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        assert!(store.load().is_none());

        std::fs::write(&path, "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&Session::new("u1", "t")).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }
}
