//! tokio-tungstenite implementation of the realtime chat ports.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use universe_core::chat::connector::{ChannelConnection, ChannelConnector};
use universe_types::error::ChatError;
use url::Url;

/// Opens chat channels with `tokio_tungstenite::connect_async`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

impl ChannelConnector for TungsteniteConnector {
    type Connection = TungsteniteConnection;

    async fn connect(&self, url: &Url) -> Result<TungsteniteConnection, ChatError> {
        let (socket, response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ChatError::Socket(e.to_string()))?;
        tracing::debug!(status = %response.status(), path = url.path(), "websocket handshake complete");
        Ok(TungsteniteConnection { socket })
    }
}

pub struct TungsteniteConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ChannelConnection for TungsteniteConnection {
    async fn send_text(&mut self, text: String) -> Result<(), ChatError> {
        self.socket
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ChatError::Socket(e.to_string()))
    }

    async fn recv_text(&mut self) -> Option<Result<String, ChatError>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "websocket closed by peer");
                    return None;
                }
                // Pings are answered by tungstenite itself.
                Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(ChatError::Socket(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
