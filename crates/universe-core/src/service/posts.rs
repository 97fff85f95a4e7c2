//! Posts, comments, saves and reactions.

use serde_json::json;
use tracing::{debug, warn};
use universe_types::error::GateError;
use universe_types::post::{Comment, NewPost, Post, Reaction};

use crate::gate::RequestGate;
use crate::reaction::ReactionState;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

pub const POSTS_PATH: &str = "/api/posts/";
pub const FOLLOWING_FEED_PATH: &str = "/api/feed/following/";
pub const SAVED_FEED_PATH: &str = "/api/feed/saved/";

pub fn post_path(pk: i64) -> String {
    format!("/api/posts/{pk}/")
}

pub fn comments_path(pk: i64) -> String {
    format!("/api/posts/{pk}/comments/")
}

pub fn react_path(pk: i64) -> String {
    format!("/api/posts/{pk}/react/")
}

pub fn save_path(pk: i64) -> String {
    format!("/api/posts/{pk}/save/")
}

pub fn tag_path(tag: &str) -> String {
    format!("/api/posts/tags/{}/", tag.trim_start_matches('#'))
}

pub struct PostService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> PostService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    /// The global feed, newest first.
    pub async fn feed(&self) -> Result<Vec<Post>, GateError> {
        self.gate.get_json(POSTS_PATH).await
    }

    pub async fn following_feed(&self) -> Result<Vec<Post>, GateError> {
        self.gate.get_json(FOLLOWING_FEED_PATH).await
    }

    pub async fn saved_feed(&self) -> Result<Vec<Post>, GateError> {
        self.gate.get_json(SAVED_FEED_PATH).await
    }

    /// Posts carrying `#tag`. A leading `#` is ignored.
    pub async fn tagged(&self, tag: &str) -> Result<Vec<Post>, GateError> {
        self.gate.get_json(tag_path(tag)).await
    }

    pub async fn get(&self, pk: i64) -> Result<Post, GateError> {
        self.gate.get_json(post_path(pk)).await
    }

    pub async fn create(&self, post: &NewPost) -> Result<Post, GateError> {
        self.gate.post_json(POSTS_PATH, post).await
    }

    pub async fn delete(&self, pk: i64) -> Result<(), GateError> {
        self.gate.delete(post_path(pk)).await
    }

    pub async fn comments(&self, pk: i64) -> Result<Vec<Comment>, GateError> {
        self.gate.get_json(comments_path(pk)).await
    }

    pub async fn comment(&self, pk: i64, content: &str) -> Result<Comment, GateError> {
        self.gate
            .post_json(comments_path(pk), &json!({ "content": content }))
            .await
    }

    /// Save or unsave a post. The saved set lives in the user's profile;
    /// refresh the user snapshot to observe it.
    pub async fn toggle_save(&self, pk: i64) -> Result<(), GateError> {
        self.gate.post(save_path(pk), json!({})).await.map(|_| ())
    }

    /// Toggle the current user's `emoji` reaction on post `pk`.
    ///
    /// `state` is updated optimistically before the call. On success the
    /// server's answer replaces the tentative reaction (204 means none); on
    /// failure `state` is restored to what it was before the call.
    pub async fn react(&self, pk: i64, state: &mut ReactionState, emoji: &str) -> Result<(), GateError> {
        let username = match self.gate.session().user().await {
            Some(user) => user.username,
            None => String::new(),
        };
        let snapshot = state.clone();
        *state = snapshot.toggled(emoji, &username);

        let response = match self.gate.post(react_path(pk), json!({ "emoji": emoji })).await {
            Ok(response) => response,
            Err(e) => {
                warn!(post = pk, %emoji, error = %e, "reaction failed, reverting");
                *state = snapshot;
                return Err(e);
            }
        };

        if response.status == 204 {
            state.mine = None;
        } else {
            match response.json::<Reaction>() {
                Ok(reaction) => state.mine = Some(reaction),
                Err(e) => debug!(post = pk, error = %e, "reaction confirmed without body"),
            }
        }
        Ok(())
    }
}
