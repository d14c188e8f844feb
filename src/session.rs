//! Session store: the single record of who is logged in.
//!
//! The session lives in memory for the running process and is written through
//! to a small key/value file so it survives restarts. The user record and the
//! bearer token are held together in one `Identity`, so a session can never
//! carry one without the other.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Storage key for the serialized user record
pub const USER_KEY: &str = "user";
/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Account role as issued by the backend.
///
/// The backend is inconsistent about the admin prefix, so both `ADMIN` and
/// `ROLE_ADMIN` parse to [`Role::Admin`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Recruiter,
    Employee,
    Other(String),
}

impl Role {
    pub fn parse(s: &str) -> Self {
        match s {
            "ADMIN" | "ROLE_ADMIN" => Role::Admin,
            "ROLE_RECRUITER" => Role::Recruiter,
            "ROLE_EMPLOYEE" => Role::Employee,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Recruiter => "ROLE_RECRUITER",
            Role::Employee => "ROLE_EMPLOYEE",
            Role::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user as remembered by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A user paired with the credential that proves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: User,
    pub token: String,
}

/// Current session state. Empty means logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity {
                user,
                token: token.into(),
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    pub fn role(&self) -> Option<&Role> {
        self.user().map(|u| &u.role)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage at {path} is not a valid key/value file: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode session data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string key/value storage backing the session
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage kept only for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten in full on every change
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: ~/.jobdesk/session.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".jobdesk").join("session.json"))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Load entries for a mutation. A corrupt file is discarded rather than
    /// blocking the write that would repair it.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Corrupt { .. }) => {
                warn!(path = %self.path.display(), "discarding corrupt session storage");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        if entries.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

/// Shared handle used by the CLI context, the views and the HTTP hooks
pub type SharedSession = Rc<RefCell<SessionStore>>;

/// Owns the in-memory session and keeps durable storage in step with it
pub struct SessionStore {
    session: Session,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            session: Session::empty(),
            storage,
        }
    }

    pub fn shared(self) -> SharedSession {
        Rc::new(RefCell::new(self))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Establish a session. Memory is updated even when persisting fails;
    /// the error only means the session will not outlive this process.
    pub fn login(&mut self, user: User, token: &str) -> Result<(), StorageError> {
        info!(email = %user.email, role = %user.role, "session established");
        let encoded = serde_json::to_string(&user)?;
        self.session = Session::authenticated(user, token);
        self.storage.set(USER_KEY, &encoded)?;
        self.storage.set(TOKEN_KEY, token)?;
        Ok(())
    }

    /// Clear the session from memory and storage. Safe to call when already
    /// logged out.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        if self.session.is_authenticated() {
            info!("session cleared");
        }
        self.session = Session::empty();
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        Ok(())
    }

    /// Drop the session because the backend rejected its credential.
    /// Returns whether a session was actually dropped.
    pub fn expire(&mut self) -> bool {
        let had_session = self.session.is_authenticated();
        if had_session {
            warn!("credential rejected by backend; clearing session");
        }
        if let Err(e) = self.logout() {
            warn!(error = %e, "failed to clear persisted session");
        }
        had_session
    }

    /// Repopulate memory from storage. Missing or malformed data leaves the
    /// session empty; this never fails.
    pub fn restore(&mut self) {
        self.session = match self.read_persisted() {
            Ok(Some((user, token))) => {
                debug!(email = %user.email, "restored persisted session");
                Session::authenticated(user, token)
            }
            Ok(None) => Session::empty(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session storage");
                Session::empty()
            }
        };
    }

    fn read_persisted(&self) -> Result<Option<(User, String)>, StorageError> {
        let user = self.storage.get(USER_KEY)?;
        let token = self.storage.get(TOKEN_KEY)?;
        let (Some(user), Some(token)) = (user, token) else {
            return Ok(None);
        };
        if token.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<User>(&user) {
            Ok(user) => Ok(Some((user, token))),
            Err(e) => {
                warn!(error = %e, "persisted user record is malformed");
                Ok(None)
            }
        }
    }
}
