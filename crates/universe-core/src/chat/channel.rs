//! Per-conversation realtime channel.
//!
//! [`ChatChannel::open`] spawns a driver task that connects, pumps frames in
//! both directions, and reconnects after unexpected closures according to the
//! [`ReconnectPolicy`]. The handle exposes the state, the ordered message log
//! and a non-blocking `send`. Dropping or closing the handle cancels the
//! driver.

use std::fmt;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::{RwLock, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use universe_types::chat::{ChatMessage, ConversationId, OutboundFrame};
use universe_types::error::ChatError;

use crate::event::EventBus;
use crate::gate::AccessTokenSource;

use super::connector::{ChannelConnection, ChannelConnector, ChannelEndpoint};
use super::log::ConversationLog;
use super::policy::ReconnectPolicy;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The handle was closed or dropped.
    Teardown,
    /// Every reconnection attempt failed.
    RetriesExhausted,
    /// No valid credential is available for the handshake.
    SessionEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// `attempt` is 0 for the first connection and counts reconnections after.
    Connecting { attempt: u32 },
    Open,
    Closed { reason: CloseReason },
}

impl ChannelState {
    pub fn is_open(&self) -> bool {
        matches!(self, ChannelState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ChannelState::Closed { .. })
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Connecting { attempt: 0 } => write!(f, "connecting"),
            ChannelState::Connecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
            ChannelState::Open => write!(f, "open"),
            ChannelState::Closed {
                reason: CloseReason::Teardown,
            } => write!(f, "closed"),
            ChannelState::Closed {
                reason: CloseReason::RetriesExhausted,
            } => write!(f, "closed: could not reconnect"),
            ChannelState::Closed {
                reason: CloseReason::SessionEnded,
            } => write!(f, "closed: session ended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    StateChanged(ChannelState),
    /// A new message was appended to the log.
    Message(ChatMessage),
}

/// What a channel needs to (re)connect.
pub struct ChannelContext<C, A> {
    pub endpoint: ChannelEndpoint,
    pub policy: ReconnectPolicy,
    pub connector: Arc<C>,
    pub tokens: Arc<A>,
}

impl<C, A> Clone for ChannelContext<C, A> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            policy: self.policy,
            connector: Arc::clone(&self.connector),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

/// Handle to an open conversation.
pub struct ChatChannel {
    conversation: ConversationId,
    log: Arc<RwLock<ConversationLog>>,
    state: watch::Receiver<ChannelState>,
    events: EventBus<ChannelEvent>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ChatChannel {
    /// Seed the log with `history` and start connecting.
    ///
    /// Must be called within a tokio runtime.
    pub fn open<C, A>(
        conversation: ConversationId,
        history: Vec<ChatMessage>,
        context: ChannelContext<C, A>,
    ) -> Self
    where
        C: ChannelConnector,
        A: AccessTokenSource + 'static,
    {
        let log = Arc::new(RwLock::new(ConversationLog::with_history(history)));
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting { attempt: 0 });
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let events = EventBus::new(EVENT_CAPACITY);
        let cancel = CancellationToken::new();

        let driver = Driver {
            conversation,
            context,
            log: Arc::clone(&log),
            state: state_tx,
            events: events.clone(),
            outbound: outbound_rx,
            unsent: None,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(driver.run());

        Self {
            conversation,
            log,
            state: state_rx,
            events,
            outbound: outbound_tx,
            cancel,
            task: Some(task),
        }
    }

    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn state_changes(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.log.read().await.messages().to_vec()
    }

    pub async fn last_message(&self) -> Option<ChatMessage> {
        self.log.read().await.last().cloned()
    }

    /// Queue `content` for transmission as `{"message": content}`.
    ///
    /// Returns once queued; there is no acknowledgement and no local echo.
    /// The message appears in the log when the backend broadcasts it back.
    /// A frame the socket fails to take is sent first on the next connection;
    /// if none opens, the channel ends `Closed`.
    pub fn send(&self, content: &str) -> Result<(), ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        match self.state() {
            ChannelState::Open => {}
            ChannelState::Closed { .. } => return Err(ChatError::Closed),
            ChannelState::Connecting { .. } => return Err(ChatError::NotConnected),
        }
        self.outbound
            .send(content.to_string())
            .map_err(|_| ChatError::Closed)
    }

    /// Tear the channel down and wait for the driver to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(conversation = %self.conversation, error = %e, "chat driver task failed");
            }
        }
    }
}

impl Drop for ChatChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl fmt::Debug for ChatChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatChannel")
            .field("conversation", &self.conversation)
            .field("state", &self.state())
            .finish()
    }
}

enum Attempt<T> {
    Connected(T),
    Failed(ChatError),
    SessionEnded,
    Cancelled,
}

#[derive(Debug, PartialEq, Eq)]
enum PumpExit {
    Cancelled,
    Dropped,
}

struct Driver<C, A> {
    conversation: ConversationId,
    context: ChannelContext<C, A>,
    log: Arc<RwLock<ConversationLog>>,
    state: watch::Sender<ChannelState>,
    events: EventBus<ChannelEvent>,
    outbound: mpsc::UnboundedReceiver<String>,
    /// Encoded frame whose send failed, retried on the next connection.
    unsent: Option<String>,
    cancel: CancellationToken,
}

impl<C, A> Driver<C, A>
where
    C: ChannelConnector,
    A: AccessTokenSource + 'static,
{
    async fn run(mut self) {
        let mut attempt: u32 = 0;
        let reason = loop {
            match self.connect().await {
                Attempt::Connected(connection) => {
                    info!(conversation = %self.conversation, "chat channel open");
                    attempt = 0;
                    self.set_state(ChannelState::Open);
                    if self.pump(connection).await == PumpExit::Cancelled {
                        break CloseReason::Teardown;
                    }
                    warn!(conversation = %self.conversation, "chat channel closed unexpectedly");
                }
                Attempt::Failed(e) => {
                    warn!(conversation = %self.conversation, attempt, error = %e, "chat connect failed");
                }
                Attempt::SessionEnded => break CloseReason::SessionEnded,
                Attempt::Cancelled => break CloseReason::Teardown,
            }

            attempt += 1;
            let Some(delay) = self.context.policy.delay_for(attempt) else {
                warn!(conversation = %self.conversation, "chat reconnection attempts exhausted");
                break CloseReason::RetriesExhausted;
            };
            self.set_state(ChannelState::Connecting { attempt });
            debug!(conversation = %self.conversation, attempt, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                _ = self.cancel.cancelled() => break CloseReason::Teardown,
                _ = tokio::time::sleep(delay) => {}
            }
        };

        info!(conversation = %self.conversation, ?reason, "chat channel closed");
        self.set_state(ChannelState::Closed { reason });
    }

    /// Fetch a fresh credential and open a connection.
    async fn connect(&self) -> Attempt<C::Connection> {
        let token = tokio::select! {
            _ = self.cancel.cancelled() => return Attempt::Cancelled,
            token = self.context.tokens.access_token() => token,
        };
        let token = match token {
            Ok(Some(token)) => token,
            Ok(None) => return Attempt::SessionEnded,
            Err(e) if e.ends_session() => return Attempt::SessionEnded,
            Err(e) => return Attempt::Failed(e.into()),
        };
        let url = match self
            .context
            .endpoint
            .url_for(self.conversation, token.expose_secret())
        {
            Ok(url) => url,
            Err(e) => return Attempt::Failed(e),
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Attempt::Cancelled,
            result = self.context.connector.connect(&url) => match result {
                Ok(connection) => Attempt::Connected(connection),
                Err(e) => Attempt::Failed(e),
            },
        }
    }

    /// Move frames until the connection drops or the channel is cancelled.
    async fn pump(&mut self, mut connection: C::Connection) -> PumpExit {
        if let Some(frame) = self.unsent.take() {
            debug!(conversation = %self.conversation, "resending unsent chat frame");
            if !self.transmit(&mut connection, frame).await {
                return PumpExit::Dropped;
            }
        }
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    connection.close().await;
                    return PumpExit::Cancelled;
                }
                outbound = self.outbound.recv() => {
                    let Some(content) = outbound else {
                        connection.close().await;
                        return PumpExit::Cancelled;
                    };
                    let frame = match serde_json::to_string(&OutboundFrame { message: content }) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "failed to encode chat frame");
                            continue;
                        }
                    };
                    if !self.transmit(&mut connection, frame).await {
                        return PumpExit::Dropped;
                    }
                }
                inbound = connection.recv_text() => match inbound {
                    Some(Ok(text)) => self.receive(&text).await,
                    Some(Err(e)) => {
                        debug!(conversation = %self.conversation, error = %e, "chat receive failed");
                        return PumpExit::Dropped;
                    }
                    None => return PumpExit::Dropped,
                },
            }
        }
    }

    /// Send one frame, keeping it for the next connection on failure.
    async fn transmit(&mut self, connection: &mut C::Connection, frame: String) -> bool {
        match connection.send_text(frame.clone()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(conversation = %self.conversation, error = %e, "chat send failed");
                self.unsent = Some(frame);
                false
            }
        }
    }

    async fn receive(&self, text: &str) {
        let message: ChatMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(conversation = %self.conversation, error = %e, "skipping malformed chat frame");
                return;
            }
        };
        let appended = self.log.write().await.append(message.clone());
        if appended {
            self.events.publish(ChannelEvent::Message(message));
        } else {
            debug!(conversation = %self.conversation, id = message.id, "duplicate chat message ignored");
        }
    }

    fn set_state(&self, state: ChannelState) {
        self.state.send_replace(state);
        self.events.publish(ChannelEvent::StateChanged(state));
    }
}
