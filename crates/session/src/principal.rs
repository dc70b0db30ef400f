//! The authenticated user record.

use std::{collections::BTreeSet, fmt};

use config::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for decoding or attaching to requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Role-specific profile data. Only `active` is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Whether the account behind this profile may log in.
    pub active: bool,
    /// Remaining profile fields, kept as received.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ProfileRecord {
    /// A profile with no extra details.
    pub fn new(active: bool) -> Self {
        Self {
            active,
            details: Map::new(),
        }
    }
}

/// Optional profile per non-administrative role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profiles {
    /// Trainer profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<ProfileRecord>,
    /// Nutritionist profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritionist: Option<ProfileRecord>,
    /// Client profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ProfileRecord>,
}

impl Profiles {
    /// Profile attached to `role`. Administrators have none.
    pub fn for_role(&self, role: Role) -> Option<&ProfileRecord> {
        match role {
            Role::Admin => None,
            Role::Trainer => self.trainer.as_ref(),
            Role::Nutritionist => self.nutritionist.as_ref(),
            Role::Client => self.client.as_ref(),
        }
    }
}

/// The principal held by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Bearer credential sent with every protected call.
    pub credential: Credential,
    /// Roles held, never empty for a stored session.
    pub roles: BTreeSet<Role>,
    /// National-ID style identifier keying profile lookups.
    pub identity: String,
    /// Role-specific profile data.
    #[serde(default)]
    pub profiles: Profiles,
}

impl Principal {
    /// Creates a principal without profiles.
    pub fn new(credential: impl Into<Credential>, roles: impl IntoIterator<Item = Role>, identity: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            roles: roles.into_iter().collect(),
            identity: identity.into(),
            profiles: Profiles::default(),
        }
    }

    /// Attaches profile data.
    pub fn with_profiles(mut self, profiles: Profiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Highest-priority role held.
    pub fn primary_role(&self) -> Option<Role> {
        Role::primary(&self.roles)
    }

    /// Profile of the primary role, if any.
    pub fn primary_profile(&self) -> Option<&ProfileRecord> {
        self.primary_role().and_then(|role| self.profiles.for_role(role))
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn credential_is_redacted_in_debug() {
        let principal = Principal::new("eyJhbGciOi.secret.sig", [Role::Client], "12345678Z");
        let debug = format!("{principal:?}");

        assert!(debug.contains("Credential([REDACTED])"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn serializes_roles_as_tags() {
        let principal = Principal::new("token", [Role::Trainer, Role::Admin], "12345678Z");
        let json = serde_json::to_string(&principal).unwrap();

        assert_snapshot!(json, @r#"{"credential":"token","roles":["ROLE_ADMIN","ROLE_TRAINER"],"identity":"12345678Z","profiles":{}}"#);
    }

    #[test]
    fn keeps_unknown_profile_fields() {
        let json = r#"{
            "credential": "token",
            "roles": ["ROLE_CLIENT"],
            "identity": "87654321X",
            "profiles": { "client": { "active": true, "name": "Ana", "goal": "strength" } }
        }"#;

        let principal: Principal = serde_json::from_str(json).unwrap();
        let profile = principal.primary_profile().unwrap();

        assert!(profile.active);
        assert_eq!(profile.details.get("name"), Some(&Value::from("Ana")));
    }

    #[test]
    fn primary_profile_follows_primary_role() {
        let profiles = Profiles {
            trainer: Some(ProfileRecord::new(false)),
            client: Some(ProfileRecord::new(true)),
            ..Profiles::default()
        };

        let principal = Principal::new("token", [Role::Client, Role::Trainer], "1").with_profiles(profiles);

        assert_eq!(principal.primary_role(), Some(Role::Trainer));
        assert_eq!(principal.primary_profile(), Some(&ProfileRecord::new(false)));

        let admin = Principal::new("token", [Role::Admin, Role::Client], "1");
        assert_eq!(admin.primary_profile(), None);
    }
}
