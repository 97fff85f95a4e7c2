//! Conversation listing, history and channel opening.

use std::sync::Arc;

use tracing::info;
use universe_types::chat::{ChatMessage, Conversation, ConversationId};
use universe_types::error::{ChatError, GateError};

use crate::gate::RequestGate;
use crate::storage::KvStore;
use crate::transport::HttpTransport;

use super::channel::{ChannelContext, ChatChannel};
use super::connector::{ChannelConnector, ChannelEndpoint};
use super::policy::ReconnectPolicy;

pub const CONVERSATIONS_PATH: &str = "/api/chat/conversations/";

pub fn messages_path(conversation: ConversationId) -> String {
    format!("/api/chat/conversations/{conversation}/messages/")
}

pub fn start_path(username: &str) -> String {
    format!("/api/chat/start/{username}/")
}

pub struct ChatService<T, S, C> {
    gate: RequestGate<T, S>,
    context: ChannelContext<C, RequestGate<T, S>>,
}

impl<T, S, C> ChatService<T, S, C>
where
    T: HttpTransport + 'static,
    S: KvStore + 'static,
    C: ChannelConnector,
{
    pub fn new(
        gate: RequestGate<T, S>,
        connector: Arc<C>,
        endpoint: ChannelEndpoint,
        policy: ReconnectPolicy,
    ) -> Self {
        let context = ChannelContext {
            endpoint,
            policy,
            connector,
            tokens: Arc::new(gate.clone()),
        };
        Self { gate, context }
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>, GateError> {
        self.gate.get_json(CONVERSATIONS_PATH).await
    }

    /// Find or create the one-to-one conversation with `username`.
    pub async fn start(&self, username: &str) -> Result<Conversation, GateError> {
        self.gate
            .post_json(start_path(username), &serde_json::json!({}))
            .await
    }

    pub async fn history(&self, conversation: ConversationId) -> Result<Vec<ChatMessage>, GateError> {
        self.gate.get_json(messages_path(conversation)).await
    }

    /// Load the history of `conversation` and open its realtime channel.
    pub async fn open(&self, conversation: ConversationId) -> Result<ChatChannel, ChatError> {
        let history = self.history(conversation).await?;
        info!(%conversation, messages = history.len(), "opening chat channel");
        Ok(ChatChannel::open(conversation, history, self.context.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use url::Url;

    use crate::chat::ChannelState;
    use crate::session::SessionManager;
    use crate::session::store::AUTH_TOKENS_KEY;
    use crate::storage::MemoryKvStore;
    use crate::testing::{MockConnector, MockTransport, fresh_token};
    use crate::transport::Method;

    async fn service(
        transport: MockTransport,
        connector: MockConnector,
        access: &str,
    ) -> ChatService<MockTransport, MemoryKvStore, MockConnector> {
        let kv = MemoryKvStore::new();
        kv.set(AUTH_TOKENS_KEY, &json!({ "access": access, "refresh": "r" }))
            .await
            .unwrap();
        let session = SessionManager::restore(Arc::new(transport), kv).await.unwrap();
        ChatService::new(
            RequestGate::new(Arc::new(session)),
            Arc::new(connector),
            ChannelEndpoint::new(Url::parse("wss://universe.app/").unwrap()),
            ReconnectPolicy::default(),
        )
    }

    #[tokio::test]
    async fn open_loads_history_and_connects_with_session_token() {
        let access = fresh_token("alice");
        let transport = MockTransport::new().on(
            Method::Get,
            &messages_path(ConversationId(42)),
            200,
            json!([
                { "id": 1, "author": 2, "author_username": "bob", "content": "oi", "timestamp": "2024-01-01T00:00:00Z" }
            ]),
        );
        let (connector, mut servers) = MockConnector::new();
        let chat = service(transport, connector, &access).await;

        let channel = chat.open(ConversationId(42)).await.unwrap();
        let server = tokio::time::timeout(Duration::from_secs(5), servers.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            server.url,
            format!("wss://universe.app/ws/chat/42/?token={access}")
        );
        assert_eq!(channel.messages().await.len(), 1);
        let mut state = channel.state_changes();
        tokio::time::timeout(Duration::from_secs(5), state.wait_for(ChannelState::is_open))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn open_fails_when_history_unavailable() {
        let transport = MockTransport::new().on(
            Method::Get,
            &messages_path(ConversationId(3)),
            403,
            json!({ "detail": "Você não faz parte desta conversa." }),
        );
        let (connector, _servers) = MockConnector::new();
        let chat = service(transport, connector, &fresh_token("alice")).await;

        let err = chat.open(ConversationId(3)).await.unwrap_err();
        assert!(matches!(err, ChatError::Gate(GateError::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn start_posts_to_username_path() {
        let transport = MockTransport::new().on(
            Method::Post,
            &start_path("bob"),
            200,
            json!({ "id": 8, "participant_usernames": ["alice", "bob"], "last_message": null }),
        );
        let (connector, _servers) = MockConnector::new();
        let chat = service(transport, connector, &fresh_token("alice")).await;

        let conversation = chat.start("bob").await.unwrap();
        assert_eq!(conversation.id, ConversationId(8));
        assert_eq!(conversation.peers("alice"), "bob");
    }
}
