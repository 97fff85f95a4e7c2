//! Session lifecycle events.
//!
//! Published by the session manager on its event bus. Front-ends subscribe to
//! redraw on user/counter changes and to switch to the login view when the
//! session ends.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::notification::NotificationCounters;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// Explicit `logout()`.
    UserRequested,
    /// The refresh credential was rejected or the refresh call failed.
    SessionExpired,
    /// The backend answered 401 to a bearer-authenticated call.
    Revoked,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutReason::UserRequested => write!(f, "logged out"),
            LogoutReason::SessionExpired => write!(f, "session expired"),
            LogoutReason::Revoked => write!(f, "session revoked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LoggedIn {
        username: String,
        /// The snapshot fetch failed; only claims are known.
        degraded: bool,
    },
    /// The profile says onboarding is incomplete; present the onboarding flow.
    OnboardingRequired { username: String },
    /// Session state is now empty. Front-ends navigate to the login view.
    LoggedOut { reason: LogoutReason },
    CredentialsRefreshed,
    UserUpdated { username: String },
    CountersUpdated { counters: NotificationCounters },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_serde_tagged() {
        let event = SessionEvent::LoggedOut {
            reason: LogoutReason::SessionExpired,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"logged_out","reason":"session_expired"}"#);
        let parsed: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
