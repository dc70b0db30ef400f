use std::sync::Arc;

use config::GuardConfig;
use session::{Principal, SessionError, SessionStore};

use crate::{AuthError, Clock, Decision, RoleHomes, Route, SystemClock, TokenValidator, roles_intersect};

/// Gates protected views on the current session.
///
/// Evaluated fresh on every render. Ambiguous session state never grants
/// access: read failures, undecodable or expired credentials all redirect to
/// the login page.
pub struct RouteGuard<C = SystemClock> {
    store: Arc<SessionStore>,
    validator: TokenValidator<C>,
    homes: RoleHomes,
}

impl RouteGuard<SystemClock> {
    /// Guard over `store` using wall-clock time.
    pub fn new(store: Arc<SessionStore>, config: &GuardConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<C: Clock> RouteGuard<C> {
    /// Guard over `store` reading time from `clock`.
    pub fn with_clock(store: Arc<SessionStore>, config: &GuardConfig, clock: C) -> Self {
        Self {
            store,
            validator: TokenValidator::new(clock),
            homes: RoleHomes::from_config(config),
        }
    }

    /// The session store consulted by the guard.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// The credential validator.
    pub fn validator(&self) -> &TokenValidator<C> {
        &self.validator
    }

    /// The role landing pages.
    pub fn homes(&self) -> &RoleHomes {
        &self.homes
    }

    /// Checks the session against `route`, keeping the reason for a denial.
    ///
    /// A credential that fails to decode or has expired also destroys the session.
    pub fn authorize(&self, route: &Route) -> Result<Principal, AuthError> {
        self.authorize_session(route).result
    }

    pub(crate) fn authorize_session(&self, route: &Route) -> Authorization {
        let (principal, epoch) = match self.store.try_load_with_epoch() {
            Ok((Some(principal), epoch)) => (principal, epoch),
            Ok((None, epoch)) => return Authorization::denied(AuthError::NoSession, Some(epoch)),
            Err(e) => {
                log::error!("Failed to read session, denying access: {e}");
                return Authorization::denied(AuthError::SessionUnreadable, None);
            }
        };

        if let Err(reason) = self.validator.check(principal.credential.expose()) {
            self.discard_session();
            return Authorization::denied(reason, None);
        }

        if principal.roles.is_empty() {
            return Authorization::denied(AuthError::EmptyRoles, Some(epoch));
        }

        if route.required.is_empty() || roles_intersect(&route.required, &principal.roles) {
            return Authorization {
                result: Ok(principal),
                epoch: Some(epoch),
            };
        }

        let home = self.homes.target_for(&principal.roles).to_string();

        Authorization::denied(AuthError::RoleMismatch { home }, Some(epoch))
    }

    /// The navigation decision for `route`.
    pub fn evaluate(&self, route: &Route) -> Decision {
        self.decide(route, self.authorize(route))
    }

    /// Ends the current session.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()
    }

    pub(crate) fn decide(&self, route: &Route, result: Result<Principal, AuthError>) -> Decision {
        match result {
            Ok(principal) => {
                log::debug!("Access granted to {}", principal.identity);
                Decision::Allow
            }
            Err(AuthError::RoleMismatch { home }) => {
                log::debug!("Role mismatch, redirecting to {home}");
                Decision::RedirectToRoleHome(home)
            }
            Err(reason) => {
                let target = route.fallback.as_deref().unwrap_or(self.homes.login_path());
                log::debug!("Redirecting to {target}: {reason}");

                Decision::RedirectToLogin(target.to_string())
            }
        }
    }

    pub(crate) fn discard_session(&self) {
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear session: {e}");
        }
    }
}

/// Result of an authorization and the session epoch it was read under.
pub(crate) struct Authorization {
    pub(crate) result: Result<Principal, AuthError>,
    /// `None` when no later session change can alter the outcome, e.g. after
    /// the guard destroyed the session itself.
    pub(crate) epoch: Option<u64>,
}

impl Authorization {
    fn denied(reason: AuthError, epoch: Option<u64>) -> Self {
        Self {
            result: Err(reason),
            epoch,
        }
    }
}
