//! FitFlow configuration structures to map the fitflow.toml configuration.

#![deny(missing_docs)]

mod guard;
mod loader;
mod role;
mod routes;
mod session;

use std::path::Path;

pub use guard::{GuardConfig, RoleHomesConfig};
pub use role::{Role, UnknownRole};
pub use routes::{RouteConfig, RoutesConfig};
use serde::Deserialize;
pub use session::{SessionConfig, StorageConfig, StorageKeys};

/// Main configuration structure for FitFlow.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Session persistence settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Route guard settings.
    #[serde(default)]
    pub guard: GuardConfig,
    /// Required roles per protected route.
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates paths and storage keys.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}
