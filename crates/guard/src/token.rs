//! Local, signature-less inspection of bearer credentials.
//!
//! The server remains the authority on signatures. Here we only need to know
//! whether a stored credential is structurally sound and unexpired, so the
//! claims are read from an untrusted token.

use std::collections::BTreeSet;

use config::Role;
use jwt_compact::UntrustedToken;
use serde::Deserialize;
use serde_json::Value;

use crate::{AuthError, Clock, SystemClock};

#[derive(Debug, Deserialize)]
struct CredentialClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default, alias = "dni")]
    identity: Option<String>,
    #[serde(default, alias = "authorities")]
    roles: Option<Value>,
}

impl CredentialClaims {
    /// Roles either as an array or as one comma/space separated string.
    fn role_tags(&self) -> Vec<String> {
        match &self.roles {
            Some(Value::String(s)) => s
                .split([',', ' '])
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(arr)) => arr.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
            _ => Vec::new(),
        }
    }
}

/// Claims of a decoded credential. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCredential {
    /// `sub` claim.
    pub subject: Option<String>,
    /// `identity` (or `dni`) claim.
    pub identity: Option<String>,
    /// Raw role tags.
    pub roles: Vec<String>,
    /// `iat`, seconds since the epoch.
    pub issued_at: Option<i64>,
    /// `exp`, seconds since the epoch.
    pub expires_at: i64,
}

impl DecodedCredential {
    /// Role tags that belong to the role enumeration.
    pub fn known_roles(&self) -> BTreeSet<Role> {
        self.roles.iter().filter_map(|tag| tag.parse().ok()).collect()
    }

    /// Whether the credential is expired at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Seconds left before expiry, zero once expired.
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Decodes credentials and checks their expiry against a [`Clock`].
#[derive(Debug, Clone, Default)]
pub struct TokenValidator<C = SystemClock> {
    clock: C,
}

impl<C: Clock> TokenValidator<C> {
    /// Validator reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Current time according to the validator's clock.
    pub fn now_seconds(&self) -> i64 {
        self.clock.now_seconds()
    }

    /// Parses `credential` without verifying its signature.
    pub fn decode(&self, credential: &str) -> Result<DecodedCredential, AuthError> {
        let token = UntrustedToken::new(credential).map_err(|e| AuthError::MalformedCredential(e.to_string()))?;

        let claims = token
            .deserialize_claims_unchecked::<CredentialClaims>()
            .map_err(|e| AuthError::MalformedCredential(e.to_string()))?;

        let Some(expiration) = claims.expiration else {
            return Err(AuthError::MalformedCredential("missing exp claim".into()));
        };

        let roles = claims.custom.role_tags();

        Ok(DecodedCredential {
            subject: claims.custom.sub,
            identity: claims.custom.identity,
            roles,
            issued_at: claims.issued_at.map(|iat| iat.timestamp()),
            expires_at: expiration.timestamp(),
        })
    }

    /// Decodes `credential` and requires its expiry to be strictly in the future.
    pub fn check(&self, credential: &str) -> Result<DecodedCredential, AuthError> {
        let decoded = self.decode(credential)?;
        let now = self.clock.now_seconds();

        if decoded.is_expired_at(now) {
            return Err(AuthError::ExpiredCredential);
        }

        Ok(decoded)
    }

    /// Whether `credential` decodes and is unexpired. Never fails.
    pub fn is_valid(&self, credential: &str) -> bool {
        self.check(credential).is_ok()
    }
}
