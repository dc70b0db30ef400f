//! Persistence of the authenticated principal.
//!
//! A single session exists at a time. The [`SessionStore`] writes the
//! serialized [`Principal`] together with a few denormalized keys (role,
//! identity, credential) into a [`SessionStorage`] backend.

#![deny(missing_docs)]

mod error;
mod principal;
mod storage;
mod store;

pub use error::{SessionError, StorageError};
pub use principal::{Credential, Principal, ProfileRecord, Profiles};
pub use storage::{FileStorage, InMemoryStorage, SessionStorage};
pub use store::SessionStore;
