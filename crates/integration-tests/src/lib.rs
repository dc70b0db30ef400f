//! Shared helpers for end-to-end tests of the session store and route guard.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use config::{Config, Role, StorageConfig};
use guard::{Decision, FixedClock, Route, RouteGuard};
use session::{Principal, SessionStore};
use tempfile::TempDir;

/// Frozen "current time" used by every test app.
pub const NOW: i64 = 1_760_000_000;

/// Claims of an unsigned test credential.
#[derive(Debug, serde::Serialize)]
pub struct TestClaims {
    pub sub: String,
    pub identity: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl TestClaims {
    /// Claims for `roles` expiring at `exp`.
    pub fn new(roles: &[Role], exp: i64) -> Self {
        Self {
            sub: "member@fitflow.test".to_string(),
            identity: "12345678Z".to_string(),
            roles: roles.iter().map(|role| role.tag().to_string()).collect(),
            iat: exp - 3600,
            exp,
        }
    }
}

/// Builds an unsigned credential; the client never verifies signatures.
pub fn unsigned_token(claims: &TestClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(serde_json::to_string(claims).unwrap());
    let signature = URL_SAFE_NO_PAD.encode(b"signature");

    format!("{header}.{claims}.{signature}")
}

/// A principal with a credential valid for an hour.
pub fn principal(roles: &[Role]) -> Principal {
    let credential = unsigned_token(&TestClaims::new(roles, NOW + 3600));

    Principal::new(credential, roles.iter().copied(), "12345678Z")
}

/// Store, guard and clock wired from a TOML configuration.
///
/// File storage is redirected into a temporary directory.
pub struct TestApp {
    pub config: Config,
    pub clock: Arc<FixedClock>,
    pub store: Arc<SessionStore>,
    pub guard: RouteGuard<Arc<FixedClock>>,
    dir: TempDir,
}

impl TestApp {
    pub fn start(config_toml: &str) -> Self {
        let mut config: Config = toml::from_str(config_toml).unwrap();
        config.validate().unwrap();

        let dir = tempfile::tempdir().unwrap();

        if let StorageConfig::File { path } = &mut config.session.storage {
            *path = dir.path().join("session.json");
        }

        let clock = Arc::new(FixedClock::at(NOW));
        let store = Arc::new(SessionStore::from_config(&config.session));
        let guard = RouteGuard::with_clock(store.clone(), &config.guard, clock.clone());

        Self {
            config,
            clock,
            store,
            guard,
            dir,
        }
    }

    /// A second app over the same storage, as after a page reload.
    pub fn reload(&self) -> (Arc<SessionStore>, RouteGuard<Arc<FixedClock>>) {
        let store = Arc::new(SessionStore::from_config(&self.config.session));
        let guard = RouteGuard::with_clock(store.clone(), &self.config.guard, self.clock.clone());

        (store, guard)
    }

    /// Location of the session document.
    pub fn session_path(&self) -> PathBuf {
        match &self.config.session.storage {
            StorageConfig::File { path } => path.clone(),
            StorageConfig::Memory => self.dir.path().join("unused"),
        }
    }

    /// Stores a principal holding `roles`.
    pub fn login_as(&self, roles: &[Role]) -> Principal {
        let principal = principal(roles);
        self.store.save(&principal).unwrap();

        principal
    }

    /// Route configured for `path`, or one open to any session.
    pub fn route(&self, path: &str) -> Route {
        self.config
            .routes
            .resolve(path)
            .map(|(_, route)| Route::from(route))
            .unwrap_or_default()
    }

    /// Guard decision for `path`.
    pub fn check(&self, path: &str) -> Decision {
        self.guard.evaluate(&self.route(path))
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
