//! Communities: discovery, membership and community feeds.

use serde_json::json;
use tracing::info;
use universe_types::community::{Community, NewCommunity};
use universe_types::error::GateError;
use universe_types::post::{NewPost, Post};
use universe_types::user::Membership;

use crate::gate::RequestGate;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

pub const COMMUNITIES_PATH: &str = "/api/communities/";
pub const CREATE_PATH: &str = "/api/communities/create/";
pub const FIND_BY_COURSE_PATH: &str = "/api/communities/find-by-course/";

pub fn community_path(id: i64) -> String {
    format!("/api/communities/{id}/")
}

pub fn join_path(id: i64) -> String {
    format!("/api/communities/{id}/join/")
}

pub fn feed_path(id: i64) -> String {
    format!("/api/communities/{id}/feed/")
}

pub fn post_path(id: i64) -> String {
    format!("/api/communities/{id}/post/")
}

pub fn members_path(id: i64) -> String {
    format!("/api/communities/{id}/members/")
}

pub fn approve_path(membership: i64) -> String {
    format!("/api/communities/members/{membership}/approve/")
}

pub fn remove_path(membership: i64) -> String {
    format!("/api/communities/members/{membership}/remove/")
}

pub struct CommunityService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> CommunityService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    pub async fn list(&self) -> Result<Vec<Community>, GateError> {
        self.gate.get_json(COMMUNITIES_PATH).await
    }

    pub async fn get(&self, id: i64) -> Result<Community, GateError> {
        self.gate.get_json(community_path(id)).await
    }

    pub async fn create(&self, community: &NewCommunity) -> Result<Community, GateError> {
        let created: Community = self.gate.post_json(CREATE_PATH, community).await?;
        info!(community = created.id, name = %created.name, "community created");
        Ok(created)
    }

    /// Communities tied to `course`.
    pub async fn find_by_course(&self, course: &str) -> Result<Vec<Community>, GateError> {
        self.gate
            .get_json_with_query(FIND_BY_COURSE_PATH, &[("course", course)])
            .await
    }

    /// Join a public community or request to join a private one. Re-fetch the
    /// community to observe the resulting membership status.
    pub async fn join(&self, id: i64) -> Result<(), GateError> {
        self.gate.post(join_path(id), json!({})).await.map(|_| ())
    }

    pub async fn feed(&self, id: i64) -> Result<Vec<Post>, GateError> {
        self.gate.get_json(feed_path(id)).await
    }

    pub async fn post(&self, id: i64, post: &NewPost) -> Result<Post, GateError> {
        self.gate.post_json(post_path(id), post).await
    }

    /// Members and pending requests. Community admins only.
    pub async fn members(&self, id: i64) -> Result<Vec<Membership>, GateError> {
        self.gate.get_json(members_path(id)).await
    }

    pub async fn approve(&self, membership: i64) -> Result<(), GateError> {
        self.gate.post(approve_path(membership), json!({})).await.map(|_| ())
    }

    /// Remove a member, or reject a pending request.
    pub async fn remove(&self, membership: i64) -> Result<(), GateError> {
        self.gate.delete(remove_path(membership)).await
    }
}
