//! Optimistic reaction state.
//!
//! A reaction toggle is applied locally before the backend confirms it. The
//! caller keeps an owned snapshot of the previous state and restores it if the
//! call fails; see `PostService::react`.

use universe_types::post::{Post, Reaction, ReactionSummary};

/// What a post shows for reactions: per-emoji counts and the current user's
/// own reaction, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionState {
    pub summary: ReactionSummary,
    pub mine: Option<Reaction>,
}

impl ReactionState {
    pub fn from_post(post: &Post) -> Self {
        Self {
            summary: post.reactions_summary.clone(),
            mine: post.current_user_reaction.clone(),
        }
    }

    /// The state after `username` taps `emoji`.
    ///
    /// Tapping the current reaction removes it, tapping another emoji switches
    /// to it, and tapping with no reaction adds one. Counts never go below
    /// zero and emojis whose count reaches zero disappear from the summary.
    pub fn toggled(&self, emoji: &str, username: &str) -> Self {
        let mut next = self.clone();
        let previous = next.mine.take().map(|r| r.emoji);

        if let Some(previous) = &previous {
            decrement(&mut next.summary, previous);
        }
        if previous.as_deref() != Some(emoji) {
            *next.summary.entry(emoji.to_string()).or_insert(0) += 1;
            next.mine = Some(Reaction {
                id: None,
                user: username.to_string(),
                emoji: emoji.to_string(),
                created_at: None,
            });
        }
        next
    }

    pub fn count(&self, emoji: &str) -> u32 {
        self.summary.get(emoji).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.summary.values().sum()
    }
}

fn decrement(summary: &mut ReactionSummary, emoji: &str) {
    if let Some(count) = summary.get_mut(emoji) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            summary.remove(emoji);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(summary: &[(&str, u32)], mine: Option<&str>) -> ReactionState {
        ReactionState {
            summary: summary.iter().map(|(e, n)| (e.to_string(), *n)).collect(),
            mine: mine.map(|emoji| Reaction {
                id: Some(1),
                user: "alice".to_string(),
                emoji: emoji.to_string(),
                created_at: None,
            }),
        }
    }

    #[test]
    fn adds_when_no_reaction() {
        let next = state(&[("❤️", 1)], None).toggled("👍", "alice");
        assert_eq!(next.count("👍"), 1);
        assert_eq!(next.count("❤️"), 1);
        assert_eq!(next.mine.unwrap().emoji, "👍");
    }

    #[test]
    fn same_emoji_removes() {
        let next = state(&[("👍", 3)], Some("👍")).toggled("👍", "alice");
        assert_eq!(next.count("👍"), 2);
        assert!(next.mine.is_none());
    }

    #[test]
    fn different_emoji_switches() {
        let next = state(&[("👍", 1), ("😂", 2)], Some("👍")).toggled("😂", "alice");
        assert!(!next.summary.contains_key("👍"));
        assert_eq!(next.count("😂"), 3);
        assert_eq!(next.total(), 3);
        assert_eq!(next.mine.unwrap().emoji, "😂");
    }

    #[test]
    fn never_underflows_on_inconsistent_summary() {
        let next = state(&[], Some("😢")).toggled("😢", "alice");
        assert_eq!(next.count("😢"), 0);
        assert!(next.summary.is_empty());
    }

    #[test]
    fn toggle_leaves_original_untouched() {
        let before = state(&[("👍", 1)], Some("👍"));
        let _ = before.toggled("😡", "alice");
        assert_eq!(before, state(&[("👍", 1)], Some("👍")));
    }
}
