//! Session persistence configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Session store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Backend that persists the session between runs.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Key names used inside the backend.
    #[serde(default)]
    pub keys: StorageKeys,
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local storage, lost when the process exits.
    Memory,
    /// A JSON document on disk.
    File {
        /// Location of the session document.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(".fitflow/session.json"),
        }
    }
}

/// Key names written by the session store.
///
/// Besides the serialized principal, the role, identity and credential are
/// stored under their own keys so other components can read them cheaply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    /// Key of the serialized principal.
    pub principal: String,
    /// Key of the primary role tag.
    pub role: String,
    /// Key of the identity string.
    pub identity: String,
    /// Key of the bearer credential.
    pub credential: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            principal: "principal".into(),
            role: "role".into(),
            identity: "identity".into(),
            credential: "credential".into(),
        }
    }
}

impl StorageKeys {
    /// Every key owned by the session, in write order.
    pub fn all(&self) -> [&str; 4] {
        [&self.principal, &self.role, &self.identity, &self.credential]
    }
}
