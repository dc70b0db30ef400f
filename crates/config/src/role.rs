//! The closed set of roles a principal can hold.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const TAG_PREFIX: &str = "ROLE_";

/// A role tag. Ordering follows [`Role::PRIORITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Personal trainer.
    Trainer,
    /// Nutritionist.
    Nutritionist,
    /// Gym client.
    Client,
}

/// Returned when a role tag is not part of the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl Role {
    /// Fixed priority used to pick a principal's home page.
    pub const PRIORITY: [Role; 4] = [Role::Admin, Role::Trainer, Role::Nutritionist, Role::Client];

    /// The wire tag, e.g. `ROLE_ADMIN`.
    pub fn tag(self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Trainer => "ROLE_TRAINER",
            Role::Nutritionist => "ROLE_NUTRITIONIST",
            Role::Client => "ROLE_CLIENT",
        }
    }

    /// First role of [`Role::PRIORITY`] contained in `roles`.
    pub fn primary<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Option<Role> {
        let held: Vec<Role> = roles.into_iter().copied().collect();

        Self::PRIORITY.into_iter().find(|role| held.contains(role))
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let name = match trimmed.get(..TAG_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(TAG_PREFIX) => &trimmed[TAG_PREFIX.len()..],
            _ => trimmed,
        };

        match name.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "trainer" => Ok(Role::Trainer),
            "nutritionist" => Ok(Role::Nutritionist),
            "client" => Ok(Role::Client),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.tag().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn parses_tags_and_bare_names() {
        assert_eq!("ROLE_ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("role_trainer".parse::<Role>(), Ok(Role::Trainer));
        assert_eq!("Nutritionist".parse::<Role>(), Ok(Role::Nutritionist));
        assert_eq!(" client ".parse::<Role>(), Ok(Role::Client));
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = "ROLE_SUPERUSER".parse::<Role>().unwrap_err();
        insta::assert_snapshot!(err, @"unknown role `ROLE_SUPERUSER`");
    }

    #[test]
    fn primary_follows_priority_not_insertion_order() {
        let roles = vec![Role::Client, Role::Nutritionist, Role::Trainer];
        assert_eq!(Role::primary(&roles), Some(Role::Trainer));

        let roles: BTreeSet<Role> = [Role::Client, Role::Admin].into_iter().collect();
        assert_eq!(Role::primary(&roles), Some(Role::Admin));

        assert_eq!(Role::primary(&Vec::<Role>::new()), None);
    }

    #[test]
    fn serializes_as_tag() {
        assert_eq!(String::from(Role::Nutritionist), "ROLE_NUTRITIONIST");
        assert_eq!(Role::Client.to_string(), "ROLE_CLIENT");
    }

    #[test]
    fn deserializes_any_accepted_spelling() {
        #[derive(Deserialize)]
        struct Wrapper {
            roles: Vec<Role>,
        }

        let wrapper: Wrapper = toml::from_str(r#"roles = ["admin", "ROLE_CLIENT"]"#).unwrap();
        assert_eq!(wrapper.roles, vec![Role::Admin, Role::Client]);
    }
}
