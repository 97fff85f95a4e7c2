//! Ordered, in-memory message log of one conversation.

use std::collections::HashSet;

use universe_types::chat::ChatMessage;

/// Messages in arrival order.
///
/// History is loaded first, then realtime frames are appended. A message whose
/// id is already present is dropped, so a replay after reconnecting does not
/// duplicate entries.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
    seen: HashSet<i64>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<ChatMessage>) -> Self {
        let mut log = Self::new();
        for message in history {
            log.append(message);
        }
        log
    }

    /// Append `message`. Returns `false` if it was already present.
    pub fn append(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
