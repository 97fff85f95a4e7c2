use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::user::Capability;

/// Errors from the low-level HTTP/WebSocket transport (no response available).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("backend unreachable: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Other(String),
}

/// Errors decoding the access credential's claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: expected three dot-separated segments")]
    Malformed,

    #[error("token payload is not valid base64url")]
    Encoding,

    #[error("token payload is not valid claims JSON: {0}")]
    Claims(String),
}

/// Errors from the key-value store (used by trait definitions in universe-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("stored value for '{key}' is corrupt: {detail}")]
    Corrupt { key: String, detail: String },
}

/// Field-level validation errors, as the backend reports them:
/// `{ "username": ["A user with that username already exists."] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a backend error body. Returns `None` unless it is a JSON object
    /// whose values are strings or arrays of strings.
    pub fn from_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let object = value.as_object()?;
        let mut fields = BTreeMap::new();
        for (field, messages) in object {
            let messages: Vec<String> = match messages {
                serde_json::Value::String(s) => vec![s.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect(),
                _ => continue,
            };
            if !messages.is_empty() {
                fields.insert(field.clone(), messages);
            }
        }
        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors from session operations (login, registration, restore).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("registration rejected: {0}")]
    Validation(FieldErrors),

    #[error("registration failed (HTTP {status})")]
    RegistrationFailed { status: u16 },

    #[error("not logged in")]
    NotAuthenticated,

    #[error("unexpected backend response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("invalid access token: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("session storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors surfaced by the outbound request gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Refresh failed; the session was torn down and the call was not dispatched.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The backend rejected a bearer credential; the session was torn down.
    #[error("session revoked by the server")]
    Unauthorized,

    /// Any other non-success response. Transient, not retried.
    #[error("request failed (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GateError {
    /// Whether this failure ended the session (the UI should show the login view).
    pub fn ends_session(&self) -> bool {
        matches!(self, GateError::SessionExpired | GateError::Unauthorized)
    }

    /// HTTP status when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            GateError::Api { status, .. } => Some(*status),
            GateError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Errors reading or changing the theme preference.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("unknown theme '{0}'")]
    Unknown(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the realtime chat channel.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat channel is not connected")]
    NotConnected,

    #[error("chat channel is closed")]
    Closed,

    #[error("message is empty")]
    EmptyMessage,

    #[error("websocket error: {0}")]
    Socket(String),

    #[error("invalid chat endpoint: {0}")]
    Endpoint(String),

    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Errors from the admin panel operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Checked locally before any call; the backend enforces the same rule.
    #[error("missing permission: {0}")]
    MissingCapability(Capability),

    #[error("invalid badge: {0}")]
    InvalidBadge(String),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl AdminError {
    pub fn ends_session(&self) -> bool {
        matches!(self, AdminError::Gate(gate) if gate.ends_session())
    }
}
