//! Community types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => write!(f, "public"),
            Privacy::Private => write!(f, "private"),
        }
    }
}

/// The caller's relation to a community, computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Admin,
    Member,
    Pending,
    #[default]
    None,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipStatus::Admin => write!(f, "admin"),
            MembershipStatus::Member => write!(f, "member"),
            MembershipStatus::Pending => write!(f, "pending"),
            MembershipStatus::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub privacy: Privacy,
    #[serde(default)]
    pub related_course: String,
    pub admin: String,
    #[serde(default)]
    pub community_image: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub membership_status: MembershipStatus,
    #[serde(default)]
    pub membership_id: Option<i64>,
}

/// Body of `POST /api/communities/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub related_course: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_status_defaults_to_none() {
        let json = r#"{"id":1,"name":"Atlética","privacy":"private","admin":"ana","created_at":"2024-01-01T00:00:00Z"}"#;
        let c: Community = serde_json::from_str(json).unwrap();
        assert_eq!(c.membership_status, MembershipStatus::None);
        assert_eq!(c.privacy, Privacy::Private);
    }

    #[test]
    fn test_membership_status_serde() {
        let s: MembershipStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(s, MembershipStatus::Pending);
        assert_eq!(s.to_string(), "pending");
    }
}
