use std::collections::BTreeSet;

use config::{GuardConfig, Role};

/// Ordered `(role, landing page)` table.
///
/// Consulted in [`Role::PRIORITY`] order against the principal's roles, not the
/// route's: an administrator who also trains lands on the admin page even when
/// the denied route was a trainer route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHomes {
    table: Vec<(Role, String)>,
    login_path: String,
}

impl RoleHomes {
    /// Table built from the guard configuration.
    pub fn from_config(config: &GuardConfig) -> Self {
        let table = Role::PRIORITY
            .into_iter()
            .map(|role| (role, config.role_homes.path_for(role).to_string()))
            .collect();

        Self {
            table,
            login_path: config.login_path.clone(),
        }
    }

    /// Landing page for a principal holding `roles`; the login page if none match.
    pub fn target_for<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> &str {
        let held: BTreeSet<Role> = roles.into_iter().copied().collect();

        self.table
            .iter()
            .find(|(role, _)| held.contains(role))
            .map(|(_, path)| path.as_str())
            .unwrap_or(&self.login_path)
    }

    /// The login page.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Default for RoleHomes {
    fn default() -> Self {
        Self::from_config(&GuardConfig::default())
    }
}
