//! User lookup, search, follow, profile and account updates.

use serde_json::json;
use tracing::{info, warn};
use universe_types::error::{GateError, SessionError};
use universe_types::user::{AccountUpdate, ProfileUpdate, UserSearchResult, UserSnapshot};

use crate::gate::RequestGate;
use crate::session::manager::user_path;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

pub const SEARCH_PATH: &str = "/api/users/search/";
pub const PROFILE_PATH: &str = "/api/profile/";
pub const ACCOUNT_PATH: &str = "/api/user/update/";
pub const DELETE_ACCOUNT_PATH: &str = "/api/profile/delete/";

pub fn follow_path(username: &str) -> String {
    format!("/api/users/{username}/follow/")
}

pub struct UserService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> UserService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    pub async fn get(&self, username: &str) -> Result<UserSnapshot, GateError> {
        self.gate.get_json(user_path(username)).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserSearchResult>, GateError> {
        self.gate
            .get_json_with_query(SEARCH_PATH, &[("q", query)])
            .await
    }

    /// Follow `username`, or unfollow if already following.
    pub async fn toggle_follow(&self, username: &str) -> Result<(), GateError> {
        self.gate.post(follow_path(username), json!({})).await.map(|_| ())
    }

    /// Re-fetch the current user's snapshot and install it in the session.
    pub async fn refresh_current(&self) -> Result<UserSnapshot, GateError> {
        let Some(me) = self.gate.session().user().await else {
            return Err(GateError::SessionExpired);
        };
        let fresh = self.get(&me.username).await?;
        match self.gate.session().replace_user(fresh.clone()).await {
            Ok(()) => {}
            Err(SessionError::NotAuthenticated) => return Err(GateError::SessionExpired),
            Err(e) => warn!(error = %e, "failed to persist refreshed user snapshot"),
        }
        Ok(fresh)
    }

    /// Apply `update` to the current user's profile, then refresh the snapshot.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserSnapshot, GateError> {
        self.gate
            .patch_json::<_, serde_json::Value>(PROFILE_PATH, update)
            .await?;
        self.refresh_current().await
    }

    /// Change name, username or email, then refresh the snapshot under the
    /// username the backend answered with.
    pub async fn update_account(&self, update: &AccountUpdate) -> Result<UserSnapshot, GateError> {
        let Some(me) = self.gate.session().user().await else {
            return Err(GateError::SessionExpired);
        };
        let saved: AccountUpdate = self.gate.patch_json(ACCOUNT_PATH, update).await?;
        let username = saved.username.unwrap_or(me.username);
        let fresh = self.get(&username).await?;
        match self.gate.session().replace_user(fresh.clone()).await {
            Ok(()) => {}
            Err(SessionError::NotAuthenticated) => return Err(GateError::SessionExpired),
            Err(e) => warn!(error = %e, "failed to persist updated user snapshot"),
        }
        info!(username = %fresh.username, "account updated");
        Ok(fresh)
    }

    /// Delete the current account and end the session.
    pub async fn delete_account(&self) -> Result<(), GateError> {
        self.gate.delete(DELETE_ACCOUNT_PATH).await?;
        info!("account deleted");
        self.gate.session().logout().await;
        Ok(())
    }

    /// Save the onboarding answers and mark onboarding complete.
    pub async fn complete_onboarding(&self, mut update: ProfileUpdate) -> Result<UserSnapshot, GateError> {
        update.onboarding_complete = Some(true);
        let user = self.update_profile(&update).await?;
        info!(username = %user.username, "onboarding complete");
        Ok(user)
    }
}
