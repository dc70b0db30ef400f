//! Error types for session persistence.

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing medium holds data that cannot be parsed.
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
    /// Internal backend error.
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Errors raised by the session store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A principal without roles cannot form a session.
    #[error("A session requires at least one role")]
    EmptyRoles,
    /// The principal could not be serialized.
    #[error("Failed to serialize principal: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
