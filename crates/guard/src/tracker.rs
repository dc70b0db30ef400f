//! Asynchronous guard evaluation.
//!
//! When the host confirms the account over the network before rendering, the
//! view needs a `Loading` state while the lookup runs, and a result that
//! arrives after a newer evaluation or after a logout must be dropped.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use config::Role;
use session::Principal;
use tokio::sync::watch;

use crate::{AuthError, Clock, Decision, DirectoryError, Route, RouteGuard, SystemClock, route_guard::Authorization};

/// Confirms that an account may still use the application.
#[allow(async_fn_in_trait)]
pub trait AccountDirectory: Send + Sync {
    /// Whether the profile of `identity` for `role` is active.
    async fn is_active(&self, identity: &str, role: Role) -> Result<bool, DirectoryError>;
}

/// Directory for hosts without an account lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl AccountDirectory for AlwaysActive {
    async fn is_active(&self, _: &str, _: Role) -> Result<bool, DirectoryError> {
        Ok(true)
    }
}

/// State exposed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// An evaluation is in flight.
    Loading,
    /// The latest evaluation finished.
    Resolved(Decision),
}

/// Runs guard evaluations that may await an account lookup.
///
/// The last evaluation scheduled wins. Results of superseded evaluations,
/// or of evaluations during which the session was saved or cleared, are
/// discarded.
pub struct GuardTracker<D, C = SystemClock> {
    guard: RouteGuard<C>,
    directory: D,
    timeout: Duration,
    latest: AtomicU64,
    state: watch::Sender<GuardState>,
}

impl<D: AccountDirectory, C: Clock> GuardTracker<D, C> {
    /// Tracker checking accounts through `directory`, giving up after `timeout`.
    pub fn new(guard: RouteGuard<C>, directory: D, timeout: Duration) -> Self {
        let (state, _) = watch::channel(GuardState::Loading);

        Self {
            guard,
            directory,
            timeout,
            latest: AtomicU64::new(0),
            state,
        }
    }

    /// The wrapped guard.
    pub fn guard(&self) -> &RouteGuard<C> {
        &self.guard
    }

    /// Current state.
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Evaluates `route`, returning `None` when the result was discarded as stale.
    pub async fn evaluate(&self, route: &Route) -> Option<Decision> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(GuardState::Loading);

        let Authorization { result, epoch } = self.guard.authorize_session(route);

        let result = match result {
            Ok(principal) => self.confirm_account(principal).await,
            Err(reason) => Err(reason),
        };

        if self.latest.load(Ordering::SeqCst) != ticket {
            log::debug!("Discarding guard evaluation superseded by a newer one");
            return None;
        }

        if epoch.is_some_and(|epoch| self.guard.store().epoch() != epoch) {
            log::debug!("Discarding guard evaluation, session changed while it ran");
            return None;
        }

        if matches!(result, Err(AuthError::InactiveAccount)) {
            self.guard.discard_session();
        }

        let decision = self.guard.decide(route, result);
        self.state.send_replace(GuardState::Resolved(decision.clone()));

        Some(decision)
    }

    async fn confirm_account(&self, principal: Principal) -> Result<Principal, AuthError> {
        let Some(role) = principal.primary_role() else {
            return Err(AuthError::EmptyRoles);
        };

        let lookup = self.directory.is_active(&principal.identity, role);

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(true)) => Ok(principal),
            Ok(Ok(false)) => Err(AuthError::InactiveAccount),
            Ok(Err(e)) => {
                log::warn!("Account lookup failed: {e}");
                Err(AuthError::AccountCheckFailed(e.to_string()))
            }
            Err(_) => {
                log::warn!("Account lookup timed out after {:?}", self.timeout);
                Err(AuthError::AccountCheckFailed("timed out".into()))
            }
        }
    }
}
