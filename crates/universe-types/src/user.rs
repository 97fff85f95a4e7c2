//! User snapshot types.
//!
//! The snapshot is the denormalized local copy of the authenticated user as
//! returned by `GET /api/users/{username}/`, persisted under `userInfo`.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::auth::AccessClaims;

/// Denormalized view of a user and the permission-relevant attributes the UI
/// needs before (or without) re-validating the credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl UserSnapshot {
    /// Minimal snapshot built from the access credential's claims.
    ///
    /// Used when the full snapshot fetch fails after login, and when restoring
    /// a session whose `userInfo` record is missing.
    pub fn from_claims(claims: &AccessClaims) -> Option<Self> {
        let username = claims.username.clone()?;
        Some(Self {
            id: claims.user_id,
            email: claims.email.clone(),
            ..Self::minimal(username)
        })
    }

    /// Snapshot that knows nothing but the username.
    pub fn minimal(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            is_staff: false,
            profile: None,
        }
    }

    /// Whether the snapshot came from claims only (no profile fetched).
    pub fn is_minimal(&self) -> bool {
        self.profile.is_none()
    }

    /// True when the profile explicitly says onboarding is still pending.
    ///
    /// A minimal snapshot does not know, so it reports `false`.
    pub fn needs_onboarding(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| !p.onboarding_complete)
    }

    pub fn badges(&self) -> &[Badge] {
        self.profile.as_ref().map_or(&[], |p| p.badges.as_slice())
    }
}

/// Profile block nested in the user snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<String>,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub following_count: u32,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub universidade: String,
    #[serde(default)]
    pub curso: String,
    #[serde(default)]
    pub atletica: String,
    #[serde(default)]
    pub ano_inicio: Option<i32>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub saved_posts: Vec<i64>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// A named permission grant attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub permissions: BadgePermissions,
}

/// Permission flags carried by a badge. Missing flags default to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BadgePermissions {
    #[serde(default)]
    pub can_access_admin_panel: bool,
    #[serde(default)]
    pub can_send_announcement: bool,
    #[serde(default)]
    pub can_moderate_global_posts: bool,
}

/// A community membership as embedded in the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    /// Username or nested user object, depending on the endpoint.
    #[serde(default)]
    pub user: serde_json::Value,
    #[serde(default)]
    pub community: serde_json::Value,
    #[serde(default)]
    pub date_joined: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Capabilities checked client-side to decide which privileged UI to offer.
///
/// Not a security boundary: the backend enforces the same rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AccessAdminPanel,
    SendAnnouncement,
    ModerateGlobalPosts,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::AccessAdminPanel,
        Capability::SendAnnouncement,
        Capability::ModerateGlobalPosts,
    ];

    /// Whether a badge's permission flags grant this capability.
    pub fn granted_by(self, permissions: &BadgePermissions) -> bool {
        match self {
            Capability::AccessAdminPanel => permissions.can_access_admin_panel,
            Capability::SendAnnouncement => permissions.can_send_announcement,
            Capability::ModerateGlobalPosts => permissions.can_moderate_global_posts,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::AccessAdminPanel => write!(f, "can_access_admin_panel"),
            Capability::SendAnnouncement => write!(f, "can_send_announcement"),
            Capability::ModerateGlobalPosts => write!(f, "can_moderate_global_posts"),
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "can_access_admin_panel" | "admin" => Ok(Capability::AccessAdminPanel),
            "can_send_announcement" | "announce" => Ok(Capability::SendAnnouncement),
            "can_moderate_global_posts" | "moderate" => Ok(Capability::ModerateGlobalPosts),
            other => Err(format!("unknown capability: '{other}'")),
        }
    }
}

/// Fields accepted by `PATCH /api/profile/`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub universidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atletica: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ano_inicio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_complete: Option<bool>,
}

/// Body of `PATCH /api/user/update/`: account fields that live on the user
/// rather than the profile. Also the shape of its response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Row returned by `GET /api/users/search/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub username: String,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_user_json() -> &'static str {
        r#"{
            "id": 4,
            "username": "alice",
            "email": "alice@uni.br",
            "first_name": "Alice",
            "last_name": "",
            "is_staff": false,
            "profile": {
                "bio": "CS student",
                "profile_pic": null,
                "cover_photo": null,
                "pronouns": "ela/dela",
                "followers_count": 12,
                "following_count": 3,
                "is_following": false,
                "universidade": "USP",
                "curso": "Computação",
                "atletica": "",
                "ano_inicio": 2023,
                "onboarding_complete": false,
                "badges": [
                    {"id": 1, "name": "Professor", "icon": "book", "color": "blue",
                     "permissions": {"can_send_announcement": true}}
                ],
                "saved_posts": [10, 11],
                "is_admin": false,
                "memberships": []
            }
        }"#
    }

    #[test]
    fn test_snapshot_deserializes_backend_shape() {
        let user: UserSnapshot = serde_json::from_str(backend_user_json()).unwrap();
        assert_eq!(user.username, "alice");
        let profile = user.profile.as_ref().unwrap();
        assert_eq!(profile.followers_count, 12);
        assert_eq!(profile.badges.len(), 1);
        assert!(profile.badges[0].permissions.can_send_announcement);
        assert!(!profile.badges[0].permissions.can_access_admin_panel);
        assert!(user.needs_onboarding());
    }

    #[test]
    fn test_from_claims_requires_username() {
        let claims = AccessClaims {
            exp: 0,
            username: None,
            user_id: Some(1),
            email: None,
        };
        assert!(UserSnapshot::from_claims(&claims).is_none());

        let claims = AccessClaims {
            username: Some("bob".to_string()),
            ..claims
        };
        let user = UserSnapshot::from_claims(&claims).unwrap();
        assert_eq!(user.username, "bob");
        assert!(user.is_minimal());
        assert!(!user.needs_onboarding());
    }

    #[test]
    fn test_capability_roundtrip() {
        for cap in Capability::ALL {
            let parsed: Capability = cap.to_string().parse().unwrap();
            assert_eq!(parsed, cap);
        }
        assert!("fly".parse::<Capability>().is_err());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("hi".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"bio": "hi"}));
    }
}
