//! Acceptance of a freshly authenticated principal.

use std::collections::BTreeSet;

use config::Role;
use serde::Deserialize;
use session::{Credential, Principal, Profiles};

use crate::{Clock, LoginError, RouteGuard};

/// Payload handed over by the authentication service.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    /// Bearer credential.
    #[serde(alias = "token")]
    pub credential: Credential,
    /// Role tags as sent by the server.
    #[serde(default)]
    pub roles: Vec<String>,
    /// National-ID style identifier.
    #[serde(alias = "dni")]
    pub identity: String,
    /// Role-specific profiles.
    #[serde(default)]
    pub profiles: Profiles,
}

/// A principal that was accepted and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    /// The stored principal.
    pub principal: Principal,
    /// Where to navigate after login.
    pub home: String,
}

impl<C: Clock> RouteGuard<C> {
    /// Validates `payload` and makes it the current session.
    ///
    /// The previous session is destroyed whether or not the payload is accepted.
    pub fn login(&self, payload: LoginPayload) -> Result<LoggedIn, LoginError> {
        match self.accept(payload) {
            Ok(principal) => {
                if let Err(e) = self.store().save(&principal) {
                    self.discard_session();
                    return Err(e.into());
                }

                let home = self.homes().target_for(&principal.roles).to_string();
                log::info!("Logged in {}, landing on {home}", principal.identity);

                Ok(LoggedIn { principal, home })
            }
            Err(e) => {
                log::debug!("Login rejected: {e}");
                self.discard_session();

                Err(e)
            }
        }
    }

    fn accept(&self, payload: LoginPayload) -> Result<Principal, LoginError> {
        let mut roles = BTreeSet::new();

        for tag in &payload.roles {
            match tag.parse::<Role>() {
                Ok(role) => {
                    roles.insert(role);
                }
                Err(e) => log::warn!("Ignoring role in login payload: {e}"),
            }
        }

        if roles.is_empty() {
            return Err(LoginError::NoRoles);
        }

        self.validator()
            .check(payload.credential.expose())
            .map_err(LoginError::Credential)?;

        let principal = Principal {
            credential: payload.credential,
            roles,
            identity: payload.identity,
            profiles: payload.profiles,
        };

        match principal.primary_role() {
            Some(role) if principal.primary_profile().is_some_and(|profile| !profile.active) => {
                Err(LoginError::InactiveProfile(role))
            }
            _ => Ok(principal),
        }
    }
}
