//! Session manager.
//!
//! Owns the current credential pair, the user snapshot and the notification
//! counters. All three are cleared together: there is no partially
//! invalidated session. Front-ends read projections (`view()`, `user()`) and
//! subscribe to [`SessionEvent`]s; only this type writes session state.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};
use universe_types::auth::{CredentialPair, RefreshResponse, TokenPair};
use universe_types::error::{FieldErrors, GateError, SessionError, StoreError};
use universe_types::notification::{NotificationCounters, NotificationStatus};
use universe_types::session::{LogoutReason, SessionEvent};
use universe_types::user::UserSnapshot;

use crate::event::EventBus;
use crate::storage::KvStore;
use crate::transport::{ApiRequest, HttpTransport};

use super::store::SessionStore;
use super::token::decode_claims;

pub const TOKEN_PATH: &str = "/api/token/";
pub const REFRESH_PATH: &str = "/api/token/refresh/";
pub const REGISTER_PATH: &str = "/api/register/";
pub const NOTIFICATION_STATUS_PATH: &str = "/api/notifications/status/";

pub fn user_path(username: &str) -> String {
    format!("/api/users/{username}/")
}

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct SessionState {
    credentials: Option<CredentialPair>,
    user: Option<UserSnapshot>,
    counters: NotificationCounters,
}

/// Read-only projection of the session for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub authenticated: bool,
    pub user: Option<UserSnapshot>,
    pub counters: NotificationCounters,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserSnapshot,
    /// The profile says onboarding is incomplete.
    pub onboarding_required: bool,
    /// The snapshot fetch failed; `user` was derived from the token claims.
    pub degraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account exists. Registration never logs in by itself.
    ProceedToLogin,
}

/// Holds and mutates the authenticated session.
///
/// Generic over the transport and key-value store so tests can run it against
/// in-memory doubles. Shared as `Arc<SessionManager<..>>` between the request
/// gate, the chat service and the front-end.
pub struct SessionManager<T, S> {
    transport: Arc<T>,
    store: SessionStore<S>,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
    events: EventBus<SessionEvent>,
}

impl<T: HttpTransport, S: KvStore> SessionManager<T, S> {
    /// A manager with no session. Nothing is read from the store.
    pub fn new(transport: Arc<T>, kv: S) -> Self {
        Self {
            transport,
            store: SessionStore::new(kv),
            state: RwLock::new(SessionState::default()),
            refresh_lock: Mutex::new(()),
            events: EventBus::new(EVENT_CAPACITY),
        }
    }

    /// Rebuild the session from the store without touching the network.
    ///
    /// Missing snapshot: derived from the token claims. Unreadable tokens:
    /// treated as no session and removed from the store.
    pub async fn restore(transport: Arc<T>, kv: S) -> Result<Self, SessionError> {
        let manager = Self::new(transport, kv);
        manager.load_persisted().await?;
        Ok(manager)
    }

    async fn load_persisted(&self) -> Result<(), SessionError> {
        let tokens = match self.store.load_tokens().await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                debug!("no persisted session");
                return Ok(());
            }
            Err(StoreError::Corrupt { key, detail }) => {
                warn!(%key, %detail, "discarding unreadable credentials");
                self.discard_persisted().await;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let claims = match decode_claims(&tokens.access) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "discarding undecodable access credential");
                self.discard_persisted().await;
                return Ok(());
            }
        };

        let stored_user = match self.store.load_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "stored user snapshot unreadable, using token claims");
                None
            }
        };
        let Some(user) = stored_user.or_else(|| UserSnapshot::from_claims(&claims)) else {
            warn!("access credential carries no username, discarding session");
            self.discard_persisted().await;
            return Ok(());
        };

        info!(username = %user.username, minimal = user.is_minimal(), "session restored");
        let mut state = self.state.write().await;
        state.credentials = Some(tokens.into());
        state.user = Some(user);
        Ok(())
    }

    async fn discard_persisted(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to remove persisted session");
        }
    }

    /// Exchange a username and password for a credential pair.
    ///
    /// Rejected credentials and network failures leave the session untouched.
    /// A failed snapshot fetch still yields a valid, degraded session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let request = ApiRequest::post(TOKEN_PATH)
            .json(json!({ "username": username, "password": password }))
            .unauthenticated();
        let response = self.transport.send(request).await?;

        match response.status {
            200..=299 => {}
            400 | 401 => {
                info!(%username, status = response.status, "login rejected");
                return Err(SessionError::InvalidCredentials);
            }
            status => {
                return Err(SessionError::UnexpectedResponse {
                    status,
                    body: response.body,
                });
            }
        }

        let tokens: TokenPair = response.json().map_err(|e| SessionError::UnexpectedResponse {
            status: response.status,
            body: e.to_string(),
        })?;
        let claims = decode_claims(&tokens.access)?;
        let canonical = claims.username.clone().unwrap_or_else(|| username.to_string());

        self.store.save_tokens(&tokens).await?;
        let credentials = CredentialPair::from(tokens);

        let (user, degraded) = match self.fetch_user(&canonical, credentials.access()).await {
            Ok(user) => (user, false),
            Err(e) => {
                warn!(username = %canonical, error = %e, "user snapshot fetch failed, continuing with token claims");
                let user = UserSnapshot::from_claims(&claims)
                    .unwrap_or_else(|| UserSnapshot::minimal(canonical.clone()));
                (user, true)
            }
        };
        if let Err(e) = self.store.save_user(&user).await {
            warn!(error = %e, "failed to persist user snapshot");
        }

        let counters = match self.fetch_counters(credentials.access()).await {
            Ok(counters) => counters,
            Err(e) => {
                debug!(error = %e, "notification status unavailable after login");
                NotificationCounters::default()
            }
        };

        {
            let mut state = self.state.write().await;
            *state = SessionState {
                credentials: Some(credentials),
                user: Some(user.clone()),
                counters,
            };
        }

        info!(username = %user.username, degraded, "logged in");
        self.events.publish(SessionEvent::LoggedIn {
            username: user.username.clone(),
            degraded,
        });
        let onboarding_required = user.needs_onboarding();
        if onboarding_required {
            self.events.publish(SessionEvent::OnboardingRequired {
                username: user.username.clone(),
            });
        }

        Ok(LoginOutcome {
            user,
            onboarding_required,
            degraded,
        })
    }

    /// Create an account. Success never logs in; the caller proceeds to login.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, SessionError> {
        let request = ApiRequest::post(REGISTER_PATH)
            .json(json!({ "username": username, "email": email, "password": password }))
            .unauthenticated();
        let response = self.transport.send(request).await?;

        match response.status {
            201 => {
                info!(%username, "account registered");
                Ok(RegisterOutcome::ProceedToLogin)
            }
            400 => match FieldErrors::from_body(&response.body) {
                Some(errors) => Err(SessionError::Validation(errors)),
                None => Err(SessionError::RegistrationFailed { status: 400 }),
            },
            status => {
                warn!(%username, status, "registration failed");
                Err(SessionError::RegistrationFailed { status })
            }
        }
    }

    /// End the session. No network call; storage errors are logged and memory
    /// is cleared regardless.
    pub async fn logout(&self) {
        self.invalidate(LogoutReason::UserRequested).await;
    }

    /// Clear credentials, snapshot and counters in memory and in the store,
    /// then announce the logout.
    pub(crate) async fn invalidate(&self, reason: LogoutReason) {
        {
            let mut state = self.state.write().await;
            *state = SessionState::default();
            if let Err(e) = self.store.clear().await {
                warn!(error = %e, "failed to clear persisted session");
            }
        }
        info!(%reason, "session ended");
        self.events.publish(SessionEvent::LoggedOut { reason });
    }

    /// Replace `stale` with a freshly minted credential pair.
    ///
    /// Single-flight: callers queue on the refresh lock, and a caller that
    /// finds the credential already replaced reuses it instead of refreshing
    /// again. Failure ends the session with [`LogoutReason::SessionExpired`].
    pub async fn refresh_credentials(&self, stale: &CredentialPair) -> Result<CredentialPair, GateError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(current) = self.credentials().await else {
            return Err(GateError::SessionExpired);
        };
        if !current.same_access(stale) {
            debug!("credential already refreshed by a concurrent caller");
            return Ok(current);
        }

        let request = ApiRequest::post(REFRESH_PATH)
            .json(json!({ "refresh": current.refresh().expose_secret() }))
            .unauthenticated();
        let refreshed = match self.transport.send(request).await {
            Ok(response) if response.is_success() => match response.json::<RefreshResponse>() {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(error = %e, "refresh response unreadable");
                    None
                }
            },
            Ok(response) => {
                warn!(status = response.status, "refresh credential rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "refresh call failed");
                None
            }
        };

        let Some(body) = refreshed else {
            self.invalidate(LogoutReason::SessionExpired).await;
            return Err(GateError::SessionExpired);
        };

        let refresh = body
            .refresh
            .unwrap_or_else(|| current.refresh().expose_secret().to_string());
        let fresh = CredentialPair::new(body.access, refresh);
        {
            let mut state = self.state.write().await;
            // A logout raced the refresh; do not resurrect the session.
            if state.credentials.is_none() {
                return Err(GateError::SessionExpired);
            }
            state.credentials = Some(fresh.clone());
            if let Err(e) = self.store.save_tokens(&fresh.to_token_pair()).await {
                warn!(error = %e, "failed to persist refreshed credentials");
            }
        }
        debug!("access credential refreshed");
        self.events.publish(SessionEvent::CredentialsRefreshed);
        Ok(fresh)
    }

    /// Install a newly fetched snapshot (after a profile change).
    pub async fn replace_user(&self, user: UserSnapshot) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        if state.credentials.is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        self.store.save_user(&user).await?;
        let username = user.username.clone();
        state.user = Some(user);
        drop(state);
        self.events.publish(SessionEvent::UserUpdated { username });
        Ok(())
    }

    /// Record the latest unread counters. Last write wins.
    pub async fn set_notification_counters(&self, counters: NotificationCounters) {
        {
            let mut state = self.state.write().await;
            if state.credentials.is_none() {
                return;
            }
            state.counters = counters;
        }
        self.events.publish(SessionEvent::CountersUpdated { counters });
    }

    async fn fetch_user(&self, username: &str, access: &SecretString) -> Result<UserSnapshot, SessionError> {
        let request = ApiRequest::get(user_path(username)).with_bearer(access.clone());
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SessionError::UnexpectedResponse {
                status: response.status,
                body: response.body,
            });
        }
        response.json().map_err(|e| SessionError::UnexpectedResponse {
            status: response.status,
            body: e.to_string(),
        })
    }

    async fn fetch_counters(&self, access: &SecretString) -> Result<NotificationCounters, SessionError> {
        let request = ApiRequest::get(NOTIFICATION_STATUS_PATH).with_bearer(access.clone());
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SessionError::UnexpectedResponse {
                status: response.status,
                body: response.body,
            });
        }
        let status: NotificationStatus = response.json().map_err(|e| SessionError::UnexpectedResponse {
            status: response.status,
            body: e.to_string(),
        })?;
        Ok(status.into())
    }

    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.state.read().await.credentials.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.credentials.is_some()
    }

    pub async fn user(&self) -> Option<UserSnapshot> {
        self.state.read().await.user.clone()
    }

    pub async fn counters(&self) -> NotificationCounters {
        self.state.read().await.counters
    }

    pub async fn view(&self) -> SessionView {
        let state = self.state.read().await;
        SessionView {
            authenticated: state.credentials.is_some(),
            user: state.user.clone(),
            counters: state.counters,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::{AUTH_TOKENS_KEY, USER_INFO_KEY};
    use crate::storage::MemoryKvStore;
    use crate::testing::{MockTransport, expired_token, fresh_token, user_json};
    use crate::transport::Method;
    use universe_types::error::TransportError;

    fn manager(transport: MockTransport) -> SessionManager<MockTransport, MemoryKvStore> {
        SessionManager::new(Arc::new(transport), MemoryKvStore::new())
    }

    fn backend_for(username: &str, access: &str) -> MockTransport {
        MockTransport::new()
            .on(
                Method::Post,
                TOKEN_PATH,
                200,
                json!({ "access": access, "refresh": "refresh-1" }),
            )
            .on(Method::Get, &user_path(username), 200, user_json(username))
            .on(
                Method::Get,
                NOTIFICATION_STATUS_PATH,
                200,
                json!({ "unread_announcements": 2, "unread_notifications": 5 }),
            )
    }

    #[tokio::test]
    async fn login_stores_pair_and_snapshot() {
        let access = fresh_token("alice");
        let session = manager(backend_for("alice", &access));
        let mut events = session.subscribe();

        let outcome = session.login("alice", "correct-pw").await.unwrap();

        assert_eq!(outcome.user.username, "alice");
        assert!(!outcome.degraded);
        assert!(!outcome.onboarding_required);
        assert!(session.is_authenticated().await);
        assert_eq!(session.user().await.unwrap().username, "alice");
        assert_eq!(
            session.counters().await,
            NotificationCounters {
                announcements: 2,
                social: 5
            }
        );

        let stored = session.store().load_tokens().await.unwrap().unwrap();
        assert_eq!(stored.access, access);
        assert_eq!(stored.refresh, "refresh-1");
        let stored_user = session.store().load_user().await.unwrap().unwrap();
        assert_eq!(stored_user.username, "alice");

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn {
                username: "alice".to_string(),
                degraded: false
            }
        );
    }

    #[tokio::test]
    async fn login_fetches_snapshot_with_new_bearer() {
        let access = fresh_token("alice");
        let session = manager(backend_for("alice", &access));
        session.login("alice", "correct-pw").await.unwrap();

        let token_call = session.transport().last_call(Method::Post, TOKEN_PATH).unwrap();
        assert!(token_call.bearer.is_none());
        assert_eq!(token_call.body.unwrap()["username"], "alice");

        let user_call = session
            .transport()
            .last_call(Method::Get, &user_path("alice"))
            .unwrap();
        assert_eq!(user_call.bearer.as_deref(), Some(access.as_str()));
    }

    #[tokio::test]
    async fn login_uses_canonical_username_from_claims() {
        let access = fresh_token("Alice");
        let transport = backend_for("Alice", &access);
        let session = manager(transport);

        let outcome = session.login("alice", "pw").await.unwrap();
        assert_eq!(outcome.user.username, "Alice");
        assert_eq!(session.transport().count(Method::Get, &user_path("Alice")), 1);
    }

    #[tokio::test]
    async fn login_wrong_password_changes_nothing() {
        let transport = MockTransport::new().on(
            Method::Post,
            TOKEN_PATH,
            401,
            json!({ "detail": "No active account found with the given credentials" }),
        );
        let session = manager(transport);

        let err = session.login("alice", "wrong-pw").await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidCredentials));
        assert!(!session.is_authenticated().await);
        assert!(session.user().await.is_none());
        assert!(session.store().kv().get(AUTH_TOKENS_KEY).await.unwrap().is_none());
        assert_eq!(session.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn login_bad_request_is_invalid_credentials() {
        let transport = MockTransport::new().on(
            Method::Post,
            TOKEN_PATH,
            400,
            json!({ "password": ["This field may not be blank."] }),
        );
        let session = manager(transport);
        let err = session.login("alice", "").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_network_failure_changes_nothing() {
        let transport = MockTransport::new().fail(
            Method::Post,
            TOKEN_PATH,
            TransportError::Connect("connection refused".to_string()),
        );
        let session = manager(transport);

        let err = session.login("alice", "pw").await.unwrap_err();

        assert!(matches!(err, SessionError::Transport(TransportError::Connect(_))));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn login_snapshot_failure_degrades_to_claims() {
        let access = fresh_token("alice");
        let transport = MockTransport::new()
            .on(
                Method::Post,
                TOKEN_PATH,
                200,
                json!({ "access": access, "refresh": "r" }),
            )
            .on(Method::Get, &user_path("alice"), 500, json!({ "detail": "boom" }));
        let session = manager(transport);

        let outcome = session.login("alice", "pw").await.unwrap();

        assert!(outcome.degraded);
        assert!(outcome.user.is_minimal());
        assert_eq!(outcome.user.username, "alice");
        assert!(session.is_authenticated().await);
        assert_eq!(session.counters().await, NotificationCounters::default());
    }

    #[tokio::test]
    async fn login_reports_pending_onboarding() {
        let access = fresh_token("carol");
        let mut profile = user_json("carol");
        profile["profile"]["onboarding_complete"] = json!(false);
        let transport = MockTransport::new()
            .on(
                Method::Post,
                TOKEN_PATH,
                200,
                json!({ "access": access, "refresh": "r" }),
            )
            .on(Method::Get, &user_path("carol"), 200, profile);
        let session = manager(transport);
        let mut events = session.subscribe();

        let outcome = session.login("carol", "pw").await.unwrap();

        assert!(outcome.onboarding_required);
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::LoggedIn { .. }));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::OnboardingRequired {
                username: "carol".to_string()
            }
        );
    }

    #[tokio::test]
    async fn login_with_undecodable_token_is_rejected_without_state() {
        let transport = MockTransport::new().on(
            Method::Post,
            TOKEN_PATH,
            200,
            json!({ "access": "not-a-jwt", "refresh": "r" }),
        );
        let session = manager(transport);

        let err = session.login("alice", "pw").await.unwrap_err();

        assert!(matches!(err, SessionError::Token(_)));
        assert!(!session.is_authenticated().await);
        assert!(session.store().load_tokens().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let access = fresh_token("alice");
        let session = manager(backend_for("alice", &access));
        session.login("alice", "pw").await.unwrap();
        let mut events = session.subscribe();

        session.logout().await;

        assert_eq!(session.view().await, SessionView::default());
        assert!(session.store().kv().get(AUTH_TOKENS_KEY).await.unwrap().is_none());
        assert!(session.store().kv().get(USER_INFO_KEY).await.unwrap().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedOut {
                reason: LogoutReason::UserRequested
            }
        );
    }

    #[tokio::test]
    async fn logout_clears_persisted_state_even_when_expired() {
        let kv = MemoryKvStore::new();
        kv.set(
            AUTH_TOKENS_KEY,
            &json!({ "access": expired_token("alice"), "refresh": "r" }),
        )
        .await
        .unwrap();
        let session = SessionManager::restore(Arc::new(MockTransport::new()), kv)
            .await
            .unwrap();
        assert!(session.is_authenticated().await);

        session.logout().await;

        assert!(!session.is_authenticated().await);
        assert!(session.store().load_tokens().await.unwrap().is_none());
        assert!(session.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn restore_uses_stored_snapshot() {
        let kv = MemoryKvStore::new();
        kv.set(
            AUTH_TOKENS_KEY,
            &json!({ "access": fresh_token("alice"), "refresh": "r" }),
        )
        .await
        .unwrap();
        kv.set(USER_INFO_KEY, &user_json("alice")).await.unwrap();

        let session = SessionManager::restore(Arc::new(MockTransport::new()), kv)
            .await
            .unwrap();

        let user = session.user().await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(!user.is_minimal());
        assert!(session.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn restore_without_snapshot_derives_from_claims() {
        let kv = MemoryKvStore::new();
        kv.set(
            AUTH_TOKENS_KEY,
            &json!({ "access": fresh_token("bob"), "refresh": "r" }),
        )
        .await
        .unwrap();

        let session = SessionManager::restore(Arc::new(MockTransport::new()), kv)
            .await
            .unwrap();

        let user = session.user().await.unwrap();
        assert_eq!(user.username, "bob");
        assert!(user.is_minimal());
    }

    #[tokio::test]
    async fn restore_discards_unreadable_tokens() {
        let kv = MemoryKvStore::new();
        kv.set(AUTH_TOKENS_KEY, &json!("not an object")).await.unwrap();
        kv.set(USER_INFO_KEY, &user_json("alice")).await.unwrap();

        let session = SessionManager::restore(Arc::new(MockTransport::new()), kv)
            .await
            .unwrap();

        assert!(!session.is_authenticated().await);
        assert!(session.user().await.is_none());
        assert!(session.store().kv().get(AUTH_TOKENS_KEY).await.unwrap().is_none());
        assert!(session.store().kv().get(USER_INFO_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_discards_undecodable_access_credential() {
        let kv = MemoryKvStore::new();
        kv.set(AUTH_TOKENS_KEY, &json!({ "access": "garbage", "refresh": "r" }))
            .await
            .unwrap();

        let session = SessionManager::restore(Arc::new(MockTransport::new()), kv)
            .await
            .unwrap();

        assert!(!session.is_authenticated().await);
        assert!(session.store().load_tokens().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_created_proceeds_to_login() {
        let transport = MockTransport::new().on(
            Method::Post,
            REGISTER_PATH,
            201,
            json!({ "username": "dave", "email": "dave@uni.br" }),
        );
        let session = manager(transport);

        let outcome = session.register("dave", "dave@uni.br", "pw").await.unwrap();

        assert_eq!(outcome, RegisterOutcome::ProceedToLogin);
        assert!(!session.is_authenticated().await);
        let call = session.transport().last_call(Method::Post, REGISTER_PATH).unwrap();
        assert_eq!(call.body.unwrap()["email"], "dave@uni.br");
    }

    #[tokio::test]
    async fn register_surfaces_field_errors() {
        let transport = MockTransport::new().on(
            Method::Post,
            REGISTER_PATH,
            400,
            json!({ "username": ["A user with that username already exists."] }),
        );
        let session = manager(transport);

        let err = session.register("dave", "dave@uni.br", "pw").await.unwrap_err();

        let SessionError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.get("username").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_other_status_is_generic_failure() {
        let transport = MockTransport::new().on(Method::Post, REGISTER_PATH, 500, json!(null));
        let session = manager(transport);

        let err = session.register("dave", "dave@uni.br", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::RegistrationFailed { status: 500 }));
    }

    #[tokio::test]
    async fn refresh_keeps_refresh_credential_when_not_rotated() {
        let kv = MemoryKvStore::new();
        let stale_access = expired_token("alice");
        kv.set(
            AUTH_TOKENS_KEY,
            &json!({ "access": stale_access, "refresh": "long-lived" }),
        )
        .await
        .unwrap();
        let new_access = fresh_token("alice");
        let transport = MockTransport::new().on(
            Method::Post,
            REFRESH_PATH,
            200,
            json!({ "access": new_access }),
        );
        let session = SessionManager::restore(Arc::new(transport), kv).await.unwrap();
        let stale = session.credentials().await.unwrap();

        let fresh = session.refresh_credentials(&stale).await.unwrap();

        assert_eq!(fresh.access().expose_secret(), new_access);
        assert_eq!(fresh.refresh().expose_secret(), "long-lived");
        let stored = session.store().load_tokens().await.unwrap().unwrap();
        assert_eq!(stored.access, new_access);
        assert_eq!(stored.refresh, "long-lived");
        let call = session.transport().last_call(Method::Post, REFRESH_PATH).unwrap();
        assert_eq!(call.body.unwrap()["refresh"], "long-lived");
    }

    #[tokio::test]
    async fn set_counters_requires_session() {
        let session = manager(MockTransport::new());
        session
            .set_notification_counters(NotificationCounters {
                announcements: 1,
                social: 1,
            })
            .await;
        assert_eq!(session.counters().await, NotificationCounters::default());
    }

    #[tokio::test]
    async fn replace_user_requires_session() {
        let session = manager(MockTransport::new());
        let err = session
            .replace_user(UserSnapshot::minimal("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }
}
