//! Realtime transport port.
//!
//! Implemented in universe-infra over tokio-tungstenite. The core only sees
//! text frames.

use universe_types::chat::ConversationId;
use universe_types::error::ChatError;
use url::Url;

/// Opens realtime connections.
pub trait ChannelConnector: Send + Sync + 'static {
    type Connection: ChannelConnection;

    fn connect(
        &self,
        url: &Url,
    ) -> impl std::future::Future<Output = Result<Self::Connection, ChatError>> + Send;
}

/// An open realtime connection carrying text frames.
pub trait ChannelConnection: Send + 'static {
    fn send_text(
        &mut self,
        text: String,
    ) -> impl std::future::Future<Output = Result<(), ChatError>> + Send;

    /// The next text frame. `None` once the peer has closed the connection.
    /// Control and binary frames are handled or skipped by the implementation.
    fn recv_text(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<String, ChatError>>> + Send;

    /// Close the connection. Errors are ignored; the connection is gone either way.
    fn close(&mut self) -> impl std::future::Future<Output = ()> + Send;
}

/// Builds per-conversation channel URLs:
/// `{base}ws/chat/{conversation_id}/?token={access}`.
#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    base: Url,
}

impl ChannelEndpoint {
    /// `base` is the WebSocket origin, e.g. `wss://universe.app/`. A path
    /// prefix is kept whether or not it ends in `/`.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url_for(&self, conversation: ConversationId, token: &str) -> Result<Url, ChatError> {
        let mut url = self
            .base
            .join(&format!("ws/chat/{conversation}/"))
            .map_err(|e| ChatError::Endpoint(e.to_string()))?;
        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url)
    }
}
