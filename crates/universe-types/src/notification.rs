//! Notification and announcement types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Unread counters shown on the notification bell.
///
/// Two independent counts: high-priority announcements and low-priority
/// social notifications. Last fetched wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationCounters {
    pub announcements: u32,
    pub social: u32,
}

impl NotificationCounters {
    pub fn total(&self) -> u32 {
        self.announcements.saturating_add(self.social)
    }
}

/// Response of `GET /api/notifications/status/`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NotificationStatus {
    #[serde(default)]
    pub unread_announcements: u32,
    #[serde(default)]
    pub unread_notifications: u32,
}

impl From<NotificationStatus> for NotificationCounters {
    fn from(status: NotificationStatus) -> Self {
        Self {
            announcements: status.unread_announcements,
            social: status.unread_notifications,
        }
    }
}

/// What a social notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVerb {
    Follow,
    Reaction,
    Comment,
    MembershipApproved,
    #[serde(other)]
    Other,
}

impl fmt::Display for NotificationVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationVerb::Follow => write!(f, "started following you"),
            NotificationVerb::Reaction => write!(f, "reacted to your post"),
            NotificationVerb::Comment => write!(f, "commented on your post"),
            NotificationVerb::MembershipApproved => {
                write!(f, "approved your membership in")
            }
            NotificationVerb::Other => write!(f, "sent you a notification"),
        }
    }
}

/// Row of `GET /api/notifications/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub sender_username: String,
    pub verb: NotificationVerb,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub community_id: Option<i64>,
    #[serde(default)]
    pub community_name: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

/// Row of `GET /api/announcements/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub target_course: String,
    #[serde(default)]
    pub target_university: String,
    /// User ids that already read this announcement.
    #[serde(default)]
    pub read_by: Vec<i64>,
}

impl Announcement {
    pub fn is_read_by(&self, user_id: i64) -> bool {
        self.read_by.contains(&user_id)
    }
}

/// Body of `POST /api/announcements/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAnnouncement {
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_university: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_course: String,
}
