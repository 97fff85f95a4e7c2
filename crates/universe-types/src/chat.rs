//! Chat conversation and message types.
//!
//! The inbound frame shape is inferred from what the backend's message
//! serializer emits; unknown fields are ignored and `author` is optional so a
//! slimmer frame still parses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// A single chat message, as received from history or the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    /// Numeric author id (present in history responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
    pub author_username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Outbound frame sent over the realtime channel: `{ "message": content }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub message: String,
}

/// Identifier of a conversation (path segment of the chat endpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row of `GET /api/chat/conversations/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(default)]
    pub participant_usernames: Vec<String>,
    #[serde(default)]
    pub last_message: Option<ChatMessage>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Participants other than `me`, joined for display.
    pub fn peers(&self, me: &str) -> String {
        let peers: Vec<&str> = self
            .participant_usernames
            .iter()
            .map(String::as_str)
            .filter(|u| *u != me)
            .collect();
        if peers.is_empty() {
            me.to_string()
        } else {
            peers.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_frame_parses_without_author_id() {
        let json = r#"{"id":7,"author_username":"bob","content":"hi","timestamp":"2024-01-01T00:00:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, 7);
        assert_eq!(msg.author, None);
        assert_eq!(msg.author_username, "bob");
        assert_eq!(msg.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_inbound_frame_accepts_offset_timestamps() {
        let json = r#"{"id":1,"author":2,"author_username":"ana","content":"oi","timestamp":"2024-05-01T10:00:00.123456-03:00"}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.author, Some(2));
        assert_eq!(msg.timestamp.format("%H:%M").to_string(), "13:00");
    }

    #[test]
    fn test_outbound_frame_shape() {
        let frame = OutboundFrame {
            message: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&frame).unwrap(),
            r#"{"message":"hello"}"#
        );
    }

    #[test]
    fn test_conversation_peers_excludes_self() {
        let conv = Conversation {
            id: ConversationId(1),
            participant_usernames: vec!["alice".to_string(), "bob".to_string()],
            last_message: None,
            updated_at: None,
        };
        assert_eq!(conv.peers("alice"), "bob");
        assert_eq!(conv.peers("carol"), "alice, bob");
    }
}
