//! Session storage abstraction.
//!
//! Holds the bearer token and the caller's identity/role between requests.
//! The file-backed store is what survives page reloads; it is the only state
//! in the client that must. No store performs network calls.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// An authenticated session: token plus the caller's identity and role.
///
/// Created on successful login; cleared on logout or on any 401 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub user_id: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Storage backend for the single active session.
///
/// `set` overwrites any prior session; `clear` is idempotent. Implementations
/// are shared across the client behind an `Arc`, so all methods take `&self`
/// and synchronize internally.
pub trait SessionStore: Send + Sync {
    /// Current session, or `None` when logged out.
    fn get(&self) -> Option<Session>;

    /// Persist a new session, replacing any prior one.
    fn set(&self, session: Session);

    /// Remove all persisted fields. Safe to call repeatedly.
    fn clear(&self);
}

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, session: Session) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// File-backed store: one JSON object holding token, username, user_id and
/// role, written on `set` and deleted on `clear`.
///
/// IO failures are logged and degrade to memory-only behavior; they never
/// surface to the caller, mirroring how a browser treats a broken
/// localStorage.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Open a store at `path`, loading any previously persisted session.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = RwLock::new(Self::load(&path));
        Self { path, cache }
    }

    fn load(path: &PathBuf) -> Option<Session> {
        let raw = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Discarding unreadable session file {:?}: {}", path, e);
                None
            }
        }
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string_pretty(session) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    tracing::warn!("Failed to persist session to {:?}: {}", self.path, e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize session: {}", e),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, session: Session) {
        self.persist(&session);
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove session file {:?}: {}", self.path, e),
        }
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
