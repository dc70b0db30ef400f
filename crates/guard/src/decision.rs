use std::{collections::BTreeSet, fmt};

use config::{Role, RouteConfig};

/// Outcome of one guard evaluation. Computed per render, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the protected view.
    Allow,
    /// Navigate to the login page (or the route's fallback).
    RedirectToLogin(String),
    /// Navigate to the landing page of the principal's highest-priority role.
    RedirectToRoleHome(String),
}

impl Decision {
    /// Whether the view may render.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Navigation target of a redirect.
    pub fn target(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin(path) | Decision::RedirectToRoleHome(path) => Some(path),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::RedirectToLogin(path) => write!(f, "redirect to login at {path}"),
            Decision::RedirectToRoleHome(path) => write!(f, "redirect to role home at {path}"),
        }
    }
}

/// Requirements a protected view declares to the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    /// Roles allowed on the view. Empty means any authenticated principal.
    pub required: BTreeSet<Role>,
    /// Replaces the login path for unauthenticated redirects.
    pub fallback: Option<String>,
}

impl Route {
    /// A view open to any authenticated principal.
    pub fn any_authenticated() -> Self {
        Self::default()
    }

    /// A view restricted to `roles`.
    pub fn requiring(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: roles.into_iter().collect(),
            fallback: None,
        }
    }

    /// Sets the unauthenticated redirect target.
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }
}

impl From<&RouteConfig> for Route {
    fn from(config: &RouteConfig) -> Self {
        Self {
            required: config.roles.clone(),
            fallback: config.redirect_to.clone(),
        }
    }
}

/// Whether `held` contains at least one of `required`.
pub fn roles_intersect(required: &BTreeSet<Role>, held: &BTreeSet<Role>) -> bool {
    !required.is_disjoint(held)
}
