//! Required roles per protected path.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::Role;

/// Protected routes keyed by path prefix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RoutesConfig(BTreeMap<String, RouteConfig>);

/// Access requirements of one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Roles allowed on the route. Empty means any authenticated principal.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    /// Where to send unauthenticated visitors instead of the login path.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl RoutesConfig {
    /// Finds the route governing `path`.
    ///
    /// An exact key wins; otherwise the longest key that is a prefix of `path`
    /// on a segment boundary is used.
    pub fn resolve(&self, path: &str) -> Option<(&str, &RouteConfig)> {
        if let Some((key, route)) = self.0.get_key_value(path) {
            return Some((key.as_str(), route));
        }

        self.0
            .iter()
            .filter(|(key, _)| covers(key, path))
            .max_by_key(|(key, _)| key.len())
            .map(|(key, route)| (key.as_str(), route))
    }

    /// Iterates over configured routes in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteConfig)> {
        self.0.iter().map(|(key, route)| (key.as_str(), route))
    }

    /// Whether no route is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RouteConfig)> for RoutesConfig {
    fn from_iter<T: IntoIterator<Item = (String, RouteConfig)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn covers(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
