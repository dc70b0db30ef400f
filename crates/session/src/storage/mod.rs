//! Storage backends for the session store.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::StorageError;

/// Synchronous key-value medium backing the session store.
///
/// Implementations are shared across threads; the session store serializes
/// its own multi-key operations on top of them.
pub trait SessionStorage: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
