//! Application state wiring all services together.
//!
//! The core services are generic over transport, storage and realtime
//! connector; AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use universe_core::chat::{ChannelEndpoint, ChatService, ReconnectPolicy};
use universe_core::gate::RequestGate;
use universe_core::service::{
    AdminService, CommunityService, NotificationService, PostService, ServerService, ThemeService,
    UserService,
};
use universe_core::session::SessionManager;
use universe_infra::config::load_client_config;
use universe_infra::filesystem::resolve_data_dir;
use universe_infra::http::ReqwestTransport;
use universe_infra::storage::ConfiguredKvStore;
use universe_infra::ws::TungsteniteConnector;
use universe_types::config::ClientConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteSession = SessionManager<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteGate = RequestGate<ReqwestTransport, ConfiguredKvStore>;
pub type ConcretePostService = PostService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteUserService = UserService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteCommunityService = CommunityService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteNotificationService = NotificationService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteAdminService = AdminService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteServerService = ServerService<ReqwestTransport, ConfiguredKvStore>;
pub type ConcreteChatService = ChatService<ReqwestTransport, ConfiguredKvStore, TungsteniteConnector>;

/// Everything a CLI command needs.
pub struct AppState {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub session: Arc<ConcreteSession>,
    pub posts: ConcretePostService,
    pub users: ConcreteUserService,
    pub communities: ConcreteCommunityService,
    pub notifications: ConcreteNotificationService,
    pub admin: ConcreteAdminService,
    pub server: ConcreteServerService,
    pub chat: ConcreteChatService,
}

impl AppState {
    /// Load config, open the session store, restore any persisted session
    /// and wire the services. No network calls are made here.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_client_config(&data_dir).await;
        tracing::debug!(api = %config.api_base_url, storage = %config.storage.backend, "configuration loaded");

        let transport = ReqwestTransport::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let store = ConfiguredKvStore::open(config.storage.backend, &data_dir);
        let session = Arc::new(
            SessionManager::restore(Arc::new(transport), store)
                .await
                .context("failed to restore session")?,
        );

        let gate: ConcreteGate = RequestGate::new(Arc::clone(&session));
        let chat = ChatService::new(
            gate.clone(),
            Arc::new(TungsteniteConnector::new()),
            ChannelEndpoint::new(config.websocket_base()),
            ReconnectPolicy::from(&config.chat),
        );

        Ok(Self {
            posts: PostService::new(gate.clone()),
            users: UserService::new(gate.clone()),
            communities: CommunityService::new(gate.clone()),
            notifications: NotificationService::new(gate.clone()),
            admin: AdminService::new(gate.clone()),
            server: ServerService::new(gate),
            chat,
            session,
            config,
            data_dir,
        })
    }

    pub fn themes(&self) -> ThemeService<'_, ConfiguredKvStore> {
        ThemeService::new(self.session.store().kv())
    }

    /// The logged-in username, or an error telling the user to log in.
    pub async fn require_login(&self) -> anyhow::Result<String> {
        match self.session.user().await {
            Some(user) => Ok(user.username),
            None => anyhow::bail!("Not logged in. Run `uni login` first."),
        }
    }
}
