//! Admin panel payloads: user permission edits and badge management.

use serde::{Deserialize, Serialize};

use crate::user::{Badge, BadgePermissions};

/// Colors a badge may be drawn with.
pub const BADGE_COLORS: [&str; 9] = [
    "default",
    "primary",
    "secondary",
    "accent",
    "info",
    "success",
    "warning",
    "error",
    "neutral",
];

pub fn is_badge_color(color: &str) -> bool {
    BADGE_COLORS.contains(&color)
}

/// Body of `POST /api/admin/badges/manage/` and
/// `PUT /api/admin/badges/manage/{id}/`.
///
/// The permission flags travel flat here, while listings nest them under
/// `permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDraft {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub can_access_admin_panel: bool,
    #[serde(default)]
    pub can_send_announcement: bool,
    #[serde(default)]
    pub can_moderate_global_posts: bool,
}

fn default_color() -> String {
    "default".to_string()
}

impl BadgeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: String::new(),
            color: default_color(),
            can_access_admin_panel: false,
            can_send_announcement: false,
            can_moderate_global_posts: false,
        }
    }

    pub fn permissions(&self) -> BadgePermissions {
        BadgePermissions {
            can_access_admin_panel: self.can_access_admin_panel,
            can_send_announcement: self.can_send_announcement,
            can_moderate_global_posts: self.can_moderate_global_posts,
        }
    }
}

impl From<&Badge> for BadgeDraft {
    fn from(badge: &Badge) -> Self {
        Self {
            name: badge.name.clone(),
            icon: badge.icon.clone(),
            color: if badge.color.is_empty() {
                default_color()
            } else {
                badge.color.clone()
            },
            can_access_admin_panel: badge.permissions.can_access_admin_panel,
            can_send_announcement: badge.permissions.can_send_announcement,
            can_moderate_global_posts: badge.permissions.can_moderate_global_posts,
        }
    }
}

/// Body of `PATCH /api/admin/users/{id}/`: staff flag and the full set of
/// badges the user should hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserUpdate {
    pub is_staff: Option<bool>,
    pub badge_ids: Option<Vec<i64>>,
}

impl Serialize for AdminUserUpdate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ProfileBadges<'a> {
            badge_ids: &'a [i64],
        }

        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            is_staff: Option<bool>,
            #[serde(skip_serializing_if = "Option::is_none")]
            profile: Option<ProfileBadges<'a>>,
        }

        Wire {
            is_staff: self.is_staff,
            profile: self
                .badge_ids
                .as_deref()
                .map(|badge_ids| ProfileBadges { badge_ids }),
        }
        .serialize(serializer)
    }
}
