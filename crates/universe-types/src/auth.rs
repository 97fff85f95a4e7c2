//! Credential types: the access/refresh pair and the claims carried by the
//! access credential.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

/// The current authentication credential pair.
///
/// Both tokens are held as [`SecretString`] so they never show up in `Debug`
/// output or tracing fields. Use [`TokenPair`] for the serialized form.
#[derive(Clone)]
pub struct CredentialPair {
    access: SecretString,
    refresh: SecretString,
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: SecretString::from(refresh.into()),
        }
    }

    /// The short-lived bearer credential.
    pub fn access(&self) -> &SecretString {
        &self.access
    }

    /// The long-lived credential used only to mint a new access credential.
    pub fn refresh(&self) -> &SecretString {
        &self.refresh
    }

    /// True when both pairs carry the same access credential.
    pub fn same_access(&self, other: &CredentialPair) -> bool {
        self.access.expose_secret() == other.access.expose_secret()
    }

    /// Serializable form for persistence under the `authTokens` key.
    pub fn to_token_pair(&self) -> TokenPair {
        TokenPair {
            access: self.access.expose_secret().to_string(),
            refresh: self.refresh.expose_secret().to_string(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

impl From<TokenPair> for CredentialPair {
    fn from(pair: TokenPair) -> Self {
        Self::new(pair.access, pair.refresh)
    }
}

/// Wire/persisted shape of the credential pair: `{ "access": ..., "refresh": ... }`.
///
/// Returned by `POST /api/token/` and stored verbatim under `authTokens`.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPair([REDACTED])")
    }
}

/// Response of `POST /api/token/refresh/`.
///
/// The refresh credential is only present when the backend rotates it; when
/// absent the previous refresh credential stays current.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Claims decoded from the access credential's payload segment.
///
/// The client never verifies the signature; the backend does. These claims
/// only drive expiry checks and the canonical username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AccessClaims {
    /// Expiry in milliseconds since the epoch.
    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }

    /// Whether the credential is expired at `now_ms`.
    ///
    /// A credential is usable while `exp * 1000 > now_ms`; a call made exactly
    /// at the expiry instant is treated as expired.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms()
    }
}
