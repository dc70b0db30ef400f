use config::Role;
use session::SessionError;

/// Reasons a principal is not granted access to a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Nothing is stored in the session store.
    #[error("No session")]
    NoSession,
    /// The session store could not be read.
    #[error("Session storage unreadable")]
    SessionUnreadable,
    /// The credential cannot be decoded.
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),
    /// The credential decodes but its expiry has passed.
    #[error("Expired credential")]
    ExpiredCredential,
    /// The stored principal holds no roles.
    #[error("Principal holds no roles")]
    EmptyRoles,
    /// Authenticated, but none of the route's roles are held.
    #[error("Role mismatch, home is {home}")]
    RoleMismatch {
        /// Landing page of the principal.
        home: String,
    },
    /// The account directory reports the account as inactive.
    #[error("Inactive account")]
    InactiveAccount,
    /// The account directory could not confirm the account in time.
    #[error("Account check failed: {0}")]
    AccountCheckFailed(String),
}

/// Failure of an [`AccountDirectory`](crate::AccountDirectory) lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Account directory error: {0}")]
pub struct DirectoryError(pub String);

/// Reasons a login payload is not accepted.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The payload lists no known role.
    #[error("Login payload carries no known role")]
    NoRoles,
    /// The credential is malformed or expired.
    #[error("Credential rejected: {0}")]
    Credential(#[source] AuthError),
    /// The profile of the primary role is inactive.
    #[error("The {0} account is inactive")]
    InactiveProfile(Role),
    /// The session could not be written.
    #[error(transparent)]
    Session(#[from] SessionError),
}
