//! Route guard configuration.

use std::time::Duration;

use duration_str::deserialize_duration;
use serde::Deserialize;

use crate::Role;

/// Settings consumed by the route guard and the login flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Where unauthenticated visitors are sent.
    pub login_path: String,
    /// Upper bound for the asynchronous account lookup before access is denied.
    #[serde(deserialize_with = "deserialize_duration")]
    pub account_check_timeout: Duration,
    /// Landing page per role.
    pub role_homes: RoleHomesConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/".into(),
            account_check_timeout: Duration::from_secs(5),
            role_homes: RoleHomesConfig::default(),
        }
    }
}

/// Landing page of every role. The order in which roles are consulted is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleHomesConfig {
    /// Home of administrators.
    pub admin: String,
    /// Home of trainers.
    pub trainer: String,
    /// Home of nutritionists.
    pub nutritionist: String,
    /// Home of clients.
    pub client: String,
}

impl Default for RoleHomesConfig {
    fn default() -> Self {
        Self {
            admin: "/admin/dashboard".into(),
            trainer: "/trainer/dashboard".into(),
            nutritionist: "/nutritionist/dashboard".into(),
            client: "/client/dashboard".into(),
        }
    }
}

impl RoleHomesConfig {
    /// Configured home of `role`.
    pub fn path_for(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::Trainer => &self.trainer,
            Role::Nutritionist => &self.nutritionist,
            Role::Client => &self.client,
        }
    }
}
