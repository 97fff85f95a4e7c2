//! Admin panel: user permissions, badge management and post moderation.
//!
//! Every operation checks the current user's capability before dispatching,
//! so a user without the badge gets [`AdminError::MissingCapability`] and the
//! backend never sees the call.

use tracing::info;
use universe_types::admin::{AdminUserUpdate, BADGE_COLORS, BadgeDraft, is_badge_color};
use universe_types::error::{AdminError, GateError};
use universe_types::post::Post;
use universe_types::user::{Badge, Capability, UserSnapshot};

use crate::capability::has_capability;
use crate::gate::RequestGate;
use crate::service::posts::post_path;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

pub const ADMIN_USERS_PATH: &str = "/api/admin/users/";
/// Badges assignable to users.
pub const ADMIN_BADGES_PATH: &str = "/api/admin/badges/";
pub const BADGES_MANAGE_PATH: &str = "/api/admin/badges/manage/";
pub const ADMIN_POSTS_PATH: &str = "/api/admin/posts/";

pub fn admin_user_path(id: i64) -> String {
    format!("{ADMIN_USERS_PATH}{id}/")
}

pub fn badge_path(id: i64) -> String {
    format!("{BADGES_MANAGE_PATH}{id}/")
}

pub struct AdminService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> AdminService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    async fn require(&self, capability: Capability) -> Result<(), AdminError> {
        let Some(me) = self.gate.session().user().await else {
            return Err(GateError::SessionExpired.into());
        };
        if has_capability(&me, capability) {
            Ok(())
        } else {
            Err(AdminError::MissingCapability(capability))
        }
    }

    pub async fn users(&self) -> Result<Vec<UserSnapshot>, AdminError> {
        self.require(Capability::AccessAdminPanel).await?;
        Ok(self.gate.get_json(ADMIN_USERS_PATH).await?)
    }

    /// Set a user's staff flag and replace their badge set.
    pub async fn update_user(&self, id: i64, update: &AdminUserUpdate) -> Result<UserSnapshot, AdminError> {
        self.require(Capability::AccessAdminPanel).await?;
        let user: UserSnapshot = self.gate.patch_json(admin_user_path(id), update).await?;
        info!(user_id = id, username = %user.username, "user permissions updated");
        Ok(user)
    }

    pub async fn badges(&self) -> Result<Vec<Badge>, AdminError> {
        self.require(Capability::AccessAdminPanel).await?;
        Ok(self.gate.get_json(ADMIN_BADGES_PATH).await?)
    }

    /// Badges with their permission flags, for editing.
    pub async fn managed_badges(&self) -> Result<Vec<Badge>, AdminError> {
        self.require(Capability::AccessAdminPanel).await?;
        Ok(self.gate.get_json(BADGES_MANAGE_PATH).await?)
    }

    pub async fn create_badge(&self, draft: &BadgeDraft) -> Result<Badge, AdminError> {
        validate(draft)?;
        self.require(Capability::AccessAdminPanel).await?;
        let badge: Badge = self.gate.post_json(BADGES_MANAGE_PATH, draft).await?;
        info!(name = %badge.name, "badge created");
        Ok(badge)
    }

    pub async fn update_badge(&self, id: i64, draft: &BadgeDraft) -> Result<Badge, AdminError> {
        validate(draft)?;
        self.require(Capability::AccessAdminPanel).await?;
        Ok(self.gate.put_json(badge_path(id), draft).await?)
    }

    pub async fn delete_badge(&self, id: i64) -> Result<(), AdminError> {
        self.require(Capability::AccessAdminPanel).await?;
        self.gate.delete(badge_path(id)).await?;
        info!(badge_id = id, "badge deleted");
        Ok(())
    }

    /// Every post on the platform, regardless of community or author.
    pub async fn posts(&self) -> Result<Vec<Post>, AdminError> {
        self.require(Capability::ModerateGlobalPosts).await?;
        Ok(self.gate.get_json(ADMIN_POSTS_PATH).await?)
    }

    /// Remove any user's post.
    pub async fn delete_post(&self, pk: i64) -> Result<(), AdminError> {
        self.require(Capability::ModerateGlobalPosts).await?;
        self.gate.delete(post_path(pk)).await?;
        info!(post = pk, "post removed by moderator");
        Ok(())
    }
}

fn validate(draft: &BadgeDraft) -> Result<(), AdminError> {
    if draft.name.trim().is_empty() {
        return Err(AdminError::InvalidBadge("name is required".to_string()));
    }
    if !is_badge_color(&draft.color) {
        return Err(AdminError::InvalidBadge(format!(
            "color must be one of {}",
            BADGE_COLORS.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::session::SessionManager;
    use crate::session::store::{AUTH_TOKENS_KEY, USER_INFO_KEY};
    use crate::storage::MemoryKvStore;
    use crate::testing::{MockTransport, fresh_token, user_json};
    use crate::transport::Method;

    async fn admin_as(user: serde_json::Value, transport: MockTransport) -> AdminService<MockTransport, MemoryKvStore> {
        let kv = MemoryKvStore::new();
        let username = user["username"].as_str().unwrap_or("alice").to_string();
        kv.set(AUTH_TOKENS_KEY, &json!({ "access": fresh_token(&username), "refresh": "r" }))
            .await
            .unwrap();
        kv.set(USER_INFO_KEY, &user).await.unwrap();
        let session = SessionManager::restore(Arc::new(transport), kv).await.unwrap();
        AdminService::new(RequestGate::new(Arc::new(session)))
    }

    fn staff(username: &str) -> serde_json::Value {
        let mut user = user_json(username);
        user["is_staff"] = json!(true);
        user
    }

    fn moderator(username: &str) -> serde_json::Value {
        let mut user = user_json(username);
        user["profile"]["badges"] = json!([{
            "id": 7,
            "name": "Moderador",
            "icon": "🛡️",
            "color": "warning",
            "permissions": { "can_moderate_global_posts": true }
        }]);
        user
    }

    fn transport(admin: &AdminService<MockTransport, MemoryKvStore>) -> &MockTransport {
        admin.gate.session().transport()
    }

    #[tokio::test]
    async fn plain_user_is_refused_without_a_backend_call() {
        let admin = admin_as(user_json("alice"), MockTransport::new()).await;

        let err = admin.users().await.unwrap_err();

        assert!(matches!(err, AdminError::MissingCapability(Capability::AccessAdminPanel)));
        assert!(transport(&admin).calls().is_empty());
    }

    #[tokio::test]
    async fn moderator_sees_posts_but_not_the_user_list() {
        let posts = MockTransport::new().on(
            Method::Get,
            ADMIN_POSTS_PATH,
            200,
            json!([{
                "pk": 3,
                "owner": "bob",
                "title": "t",
                "content": "c",
                "createdAt": "2025-05-01T12:00:00Z"
            }]),
        );
        let admin = admin_as(moderator("mod"), posts).await;

        let listed = admin.posts().await.unwrap();
        assert_eq!(listed[0].pk, 3);

        let err = admin.badges().await.unwrap_err();
        assert!(matches!(err, AdminError::MissingCapability(Capability::AccessAdminPanel)));
        assert_eq!(transport(&admin).calls().len(), 1);
    }

    #[tokio::test]
    async fn moderator_deletes_any_post() {
        let admin = admin_as(
            moderator("mod"),
            MockTransport::new().on(Method::Delete, &post_path(9), 204, json!(null)),
        )
        .await;

        admin.delete_post(9).await.unwrap();

        assert_eq!(transport(&admin).count(Method::Delete, &post_path(9)), 1);
    }

    #[tokio::test]
    async fn update_user_sends_badges_inside_profile() {
        let mut updated = user_json("bob");
        updated["is_staff"] = json!(true);
        let admin = admin_as(
            staff("root"),
            MockTransport::new().on(Method::Patch, &admin_user_path(2), 200, updated),
        )
        .await;

        let update = AdminUserUpdate {
            is_staff: Some(true),
            badge_ids: Some(vec![1, 7]),
        };
        let user = admin.update_user(2, &update).await.unwrap();

        assert!(user.is_staff);
        let call = transport(&admin).last_call(Method::Patch, &admin_user_path(2)).unwrap();
        assert_eq!(
            call.body.unwrap(),
            json!({ "is_staff": true, "profile": { "badge_ids": [1, 7] } })
        );
    }

    #[tokio::test]
    async fn update_badge_puts_flat_permissions() {
        let admin = admin_as(
            staff("root"),
            MockTransport::new().on(
                Method::Put,
                &badge_path(4),
                200,
                json!({ "id": 4, "name": "Monitor", "icon": "📘", "color": "info",
                        "permissions": { "can_send_announcement": true } }),
            ),
        )
        .await;

        let mut draft = BadgeDraft::new("Monitor");
        draft.icon = "📘".to_string();
        draft.color = "info".to_string();
        draft.can_send_announcement = true;
        let badge = admin.update_badge(4, &draft).await.unwrap();

        assert!(badge.permissions.can_send_announcement);
        let call = transport(&admin).last_call(Method::Put, &badge_path(4)).unwrap();
        let body = call.body.unwrap();
        assert_eq!(body["name"], "Monitor");
        assert_eq!(body["can_send_announcement"], true);
        assert_eq!(body["can_access_admin_panel"], false);
    }

    #[tokio::test]
    async fn invalid_badge_is_rejected_locally() {
        let admin = admin_as(staff("root"), MockTransport::new()).await;

        let mut draft = BadgeDraft::new("Ouro");
        draft.color = "gold".to_string();
        assert!(matches!(
            admin.create_badge(&draft).await,
            Err(AdminError::InvalidBadge(_))
        ));
        assert!(matches!(
            admin.create_badge(&BadgeDraft::new("  ")).await,
            Err(AdminError::InvalidBadge(_))
        ));
        assert!(transport(&admin).calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_bearer_ends_the_session() {
        let admin = admin_as(
            staff("root"),
            MockTransport::new().on(Method::Get, ADMIN_BADGES_PATH, 401, json!({ "detail": "bad token" })),
        )
        .await;

        let err = admin.badges().await.unwrap_err();

        assert!(err.ends_session());
        assert!(!admin.gate.session().is_authenticated().await);
    }
}
