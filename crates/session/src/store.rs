//! The session store.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use config::{Role, SessionConfig, StorageConfig, StorageKeys};
use http::HeaderValue;

use crate::{Credential, FileStorage, InMemoryStorage, Principal, SessionError, SessionStorage, StorageError};

/// Single source of truth for the logged-in principal.
///
/// `save`, `load` and `clear` hold one lock for their whole duration, so they
/// appear atomic to each other even when the store is shared between threads.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    keys: StorageKeys,
    lock: Mutex<()>,
    epoch: AtomicU64,
}

impl SessionStore {
    /// Store over an existing backend.
    pub fn new(storage: Arc<dyn SessionStorage>, keys: StorageKeys) -> Self {
        Self {
            storage,
            keys,
            lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Store over a fresh in-memory backend with default keys.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()), StorageKeys::default())
    }

    /// Store over the backend named in the configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        let storage: Arc<dyn SessionStorage> = match &config.storage {
            StorageConfig::Memory => {
                log::debug!("Using in-memory session storage");
                Arc::new(InMemoryStorage::new())
            }
            StorageConfig::File { path } => {
                log::debug!("Using file session storage at {}", path.display());
                Arc::new(FileStorage::new(path))
            }
        };

        Self::new(storage, config.keys.clone())
    }

    /// Counter changed by every `save` and `clear`.
    ///
    /// Work started under one epoch must not be applied under another.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Replaces any current session with `principal`.
    pub fn save(&self, principal: &Principal) -> Result<(), SessionError> {
        let Some(role) = principal.primary_role() else {
            return Err(SessionError::EmptyRoles);
        };

        let serialized = serde_json::to_string(principal)?;

        let _guard = self.lock();
        self.bump_epoch();

        if let Err(e) = self.write_session(principal, role, &serialized) {
            log::error!("Failed to save session, discarding partial writes: {e}");

            if let Err(cleanup) = self.remove_all() {
                log::error!("Failed to discard partial session: {cleanup}");
            }

            return Err(e.into());
        }

        log::debug!("Session saved for {} with primary role {role}", principal.identity);

        Ok(())
    }

    /// The principal key goes last; `load` only sees a session once every key is written.
    fn write_session(&self, principal: &Principal, role: Role, serialized: &str) -> Result<(), StorageError> {
        self.remove_all()?;

        self.storage.set(&self.keys.role, role.tag())?;
        self.storage.set(&self.keys.identity, &principal.identity)?;
        self.storage.set(&self.keys.credential, principal.credential.expose())?;
        self.storage.set(&self.keys.principal, serialized)?;

        Ok(())
    }

    /// The stored principal.
    ///
    /// Unparsable or role-less data is purged and reported as no session.
    /// Only backend failures are returned as errors.
    pub fn try_load(&self) -> Result<Option<Principal>, SessionError> {
        let _guard = self.lock();
        self.read_principal()
    }

    fn read_principal(&self) -> Result<Option<Principal>, SessionError> {
        let raw = match self.storage.get(&self.keys.principal) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(StorageError::Corrupt(reason)) => {
                log::warn!("Session storage is corrupt, purging: {reason}");
                self.purge();
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Principal>(&raw) {
            Ok(principal) if !principal.roles.is_empty() => Ok(Some(principal)),
            Ok(_) => {
                log::warn!("Stored session has no roles, purging");
                self.purge();
                Ok(None)
            }
            Err(e) => {
                log::warn!("Stored session could not be parsed, purging: {e}");
                self.purge();
                Ok(None)
            }
        }
    }

    /// The stored principal together with the epoch it was read under.
    ///
    /// Both are taken under the store lock, so a later `save` or `clear` is
    /// always visible as a changed [`epoch`](Self::epoch).
    pub fn try_load_with_epoch(&self) -> Result<(Option<Principal>, u64), SessionError> {
        let _guard = self.lock();
        let principal = self.read_principal()?;

        Ok((principal, self.epoch()))
    }

    /// The stored principal, with every failure folded into `None`.
    pub fn load(&self) -> Option<Principal> {
        match self.try_load() {
            Ok(principal) => principal,
            Err(e) => {
                log::error!("Failed to read session: {e}");
                None
            }
        }
    }

    /// Removes every session key. Clearing an absent session is a no-op.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock();
        self.bump_epoch();
        self.remove_all()?;

        log::debug!("Session cleared");

        Ok(())
    }

    /// Denormalized bearer credential.
    pub fn credential(&self) -> Option<Credential> {
        self.read_key(&self.keys.credential).map(Credential::from)
    }

    /// Denormalized primary role.
    pub fn role(&self) -> Option<Role> {
        self.read_key(&self.keys.role).and_then(|tag| tag.parse().ok())
    }

    /// Denormalized identity.
    pub fn identity(&self) -> Option<String> {
        self.read_key(&self.keys.identity)
    }

    /// `Authorization` header value for outgoing requests.
    pub fn authorization_header(&self) -> Option<HeaderValue> {
        let credential = self.credential()?;

        match HeaderValue::from_str(&format!("Bearer {}", credential.expose())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                log::warn!("Stored credential is not a valid header value");
                None
            }
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        let _guard = self.lock();

        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to read session key '{key}': {e}");
                None
            }
        }
    }

    fn remove_all(&self) -> Result<(), StorageError> {
        for key in self.keys.all() {
            self.storage.remove(key)?;
        }

        Ok(())
    }

    fn purge(&self) {
        self.bump_epoch();

        if let Err(e) = self.remove_all() {
            log::error!("Failed to purge session storage: {e}");
        }
    }

    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
