//! # Session Store
//!
//! Durable identity state: session token, username, user id and the role set
//! handed back by the server on login. The in-memory [`Session`] is the sole
//! source of truth for "is logged in" and for role checks; persistence goes
//! through an injectable [`SessionBackend`] so tests run against memory while
//! production writes `~/.quorum-console/session.json`.
//!
//! All file writes use atomic rename (write `.tmp`, then `rename()`) for
//! crash safety.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Identity state for the logged-in user. `token` non-empty means
/// authenticated; everything is cleared wholesale on logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub user_id: Option<String>,
    pub roles: BTreeSet<String>,
}

/// On-disk shape of a session. Roles are stored comma-joined, matching the
/// format the server's browser console persists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: String,
    pub username: String,
    pub user_id: Option<String>,
    pub user_roles: String,
}

impl PersistedSession {
    fn from_session(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            username: session.username.clone(),
            user_id: session.user_id.clone(),
            user_roles: session.roles.iter().cloned().collect::<Vec<_>>().join(","),
        }
    }

    fn into_session(self) -> Session {
        Session {
            token: self.token,
            username: self.username,
            user_id: self.user_id,
            roles: self
                .user_roles
                .split(',')
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Where session state survives between runs.
pub trait SessionBackend {
    fn load(&self) -> io::Result<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Production backend: JSON file under the console's home directory.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns `~/.quorum-console/session.json`, creating the directory if needed.
    pub fn default_path() -> io::Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        let dir = home.join(".quorum-console");
        fs::create_dir_all(&dir)?;
        Ok(dir.join("session.json"))
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl SessionBackend for FileBackend {
    fn load(&self) -> io::Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> io::Result<()> {
        atomic_write_json(&self.path, session)
    }

    fn clear(&self) -> io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Test backend: a mutex-guarded slot.
#[derive(Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<PersistedSession>>,
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> io::Result<Option<PersistedSession>> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &PersistedSession) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Process-wide session singleton with explicit lifecycle: `login` and
/// `logout` are the only writes.
pub struct SessionStore {
    session: Session,
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    /// Create a store over `backend`, restoring any persisted session.
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        let session = match backend.load() {
            Ok(Some(persisted)) => {
                debug!("Restored session for '{}'", persisted.username);
                persisted.into_session()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Failed to restore session, starting logged out: {}", e);
                Session::default()
            }
        };
        Self { session, backend }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Store a fresh identity after a successful authentication.
    pub fn login(
        &mut self,
        token: String,
        username: String,
        user_id: Option<String>,
        roles: BTreeSet<String>,
    ) {
        self.session = Session {
            token,
            username,
            user_id,
            roles,
        };
        if let Err(e) = self
            .backend
            .save(&PersistedSession::from_session(&self.session))
        {
            warn!("Failed to persist session: {}", e);
        }
    }

    /// Clear every session field. Idempotent: safe to call while already
    /// logged out.
    pub fn logout(&mut self) {
        self.session = Session::default();
        if let Err(e) = self.backend.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.session.token.is_empty()
    }

    /// True iff every role in `required` is held. An empty `required` set is
    /// vacuously true: no gating.
    pub fn has_all_roles<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        required
            .into_iter()
            .all(|role| self.session.roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;

    fn roles(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_starts_logged_out() {
        let store = memory_store();
        assert!(!store.is_authenticated());
        assert!(store.session().roles.is_empty());
    }

    #[test]
    fn test_login_then_logout_clears_everything() {
        let mut store = memory_store();
        store.login(
            "tok".into(),
            "alice".into(),
            Some("u-1".into()),
            roles(&["admin", "approver"]),
        );
        assert!(store.is_authenticated());

        store.logout();
        assert_eq!(store.session(), &Session::default());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut store = memory_store();
        store.login("tok".into(), "alice".into(), None, roles(&["admin"]));
        store.logout();
        let after_first = store.session().clone();
        store.logout();
        assert_eq!(store.session(), &after_first);
    }

    #[test]
    fn test_has_all_roles_empty_required_is_vacuous() {
        let store = memory_store();
        assert!(store.has_all_roles([]));
    }

    #[test]
    fn test_has_all_roles_subset() {
        let mut store = memory_store();
        store.login(
            "tok".into(),
            "bob".into(),
            None,
            roles(&["requester", "approver"]),
        );
        assert!(store.has_all_roles(["approver"]));
        assert!(store.has_all_roles(["requester", "approver"]));
        assert!(!store.has_all_roles(["admin"]));
        assert!(!store.has_all_roles(["approver", "admin"]));
    }

    #[test]
    fn test_session_survives_reload_roles_comma_joined() {
        let backend = std::sync::Arc::new(MemoryBackend::default());

        struct Shared(std::sync::Arc<MemoryBackend>);
        impl SessionBackend for Shared {
            fn load(&self) -> io::Result<Option<PersistedSession>> {
                self.0.load()
            }
            fn save(&self, s: &PersistedSession) -> io::Result<()> {
                self.0.save(s)
            }
            fn clear(&self) -> io::Result<()> {
                self.0.clear()
            }
        }

        let mut store = SessionStore::new(Box::new(Shared(backend.clone())));
        store.login(
            "tok".into(),
            "alice".into(),
            Some("u-1".into()),
            roles(&["admin", "requester"]),
        );

        let persisted = backend.load().unwrap().unwrap();
        assert_eq!(persisted.user_roles, "admin,requester");

        let restored = SessionStore::new(Box::new(Shared(backend)));
        assert!(restored.is_authenticated());
        assert_eq!(restored.session().username, "alice");
        assert!(restored.has_all_roles(["admin", "requester"]));
    }
}
