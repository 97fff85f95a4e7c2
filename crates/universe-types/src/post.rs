//! Post, comment, and reaction types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::Badge;

/// Emojis the backend accepts as reactions.
pub const REACTION_EMOJIS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "😡"];

/// Whether `emoji` is one of the accepted reactions.
pub fn is_allowed_reaction(emoji: &str) -> bool {
    REACTION_EMOJIS.contains(&emoji)
}

/// Emoji -> count, as returned in `reactions_summary`.
pub type ReactionSummary = BTreeMap<String, u32>;

/// A post in a feed (global, following, saved, hashtag, or community).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub pk: i64,
    pub owner: String,
    #[serde(default)]
    pub owner_badges: Vec<Badge>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub community: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reactions_summary: ReactionSummary,
    #[serde(default)]
    pub current_user_reaction: Option<Reaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub user: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_profile_pic: Option<String>,
}

/// The current user's reaction to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default)]
    pub id: Option<i64>,
    pub user: String,
    pub emoji: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/posts/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_camel_case_timestamps() {
        let json = r#"{
            "pk": 3, "owner": "alice", "title": "Oi", "content": "Primeiro post",
            "createdAt": "2024-03-01T12:00:00Z", "updatedAt": "2024-03-01T12:05:00Z",
            "tags": [{"name": "calouros"}],
            "reactions_summary": {"👍": 2},
            "current_user_reaction": {"id": 8, "user": "alice", "emoji": "👍", "created_at": "2024-03-01T12:01:00Z"}
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.pk, 3);
        assert_eq!(post.tags[0].name, "calouros");
        assert_eq!(post.reactions_summary.get("👍"), Some(&2));
        assert_eq!(post.current_user_reaction.unwrap().emoji, "👍");
    }

    #[test]
    fn test_allowed_reactions() {
        assert!(is_allowed_reaction("👍"));
        assert!(is_allowed_reaction("😡"));
        assert!(!is_allowed_reaction("🍕"));
    }
}
