//! Test doubles shared by the unit tests in this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use universe_types::auth::AccessClaims;
use universe_types::error::{ChatError, GateError, TransportError};
use url::Url;

use crate::chat::connector::{ChannelConnection, ChannelConnector};
use crate::gate::AccessTokenSource;
use crate::session::token::encode_unsigned;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method};

/// A call the mock transport received.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

type Scripted = Result<ApiResponse, TransportError>;

/// Scripted transport: each route answers from a queue, and the last queued
/// answer repeats. Unknown routes answer 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer, widening race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn on(self, method: Method, path: &str, status: u16, body: serde_json::Value) -> Self {
        let body = if body.is_null() { String::new() } else { body.to_string() };
        self.push(method, path, Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(self, method: Method, path: &str, error: TransportError) -> Self {
        self.push(method, path, Err(error));
        self
    }

    fn push(&self, method: Method, path: &str, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(answer);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn last_call(&self, method: Method, path: &str) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.method == method && c.path == path)
            .cloned()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            bearer: request.bearer.as_ref().map(|t| t.expose_secret().to_string()),
            body: request.body.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(request.method, request.path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Ok(ApiResponse::new(404, r#"{"detail":"Not found."}"#)),
        }
    }
}

/// An unsigned access credential for `username` expiring at `exp` (seconds).
pub(crate) fn token(username: &str, exp: i64) -> String {
    encode_unsigned(&AccessClaims {
        exp,
        username: Some(username.to_string()),
        user_id: Some(1),
        email: None,
    })
}

/// A credential valid for the next hour.
pub(crate) fn fresh_token(username: &str) -> String {
    token(username, crate::now_ms() / 1000 + 3600)
}

/// A credential that expired one second ago.
pub(crate) fn expired_token(username: &str) -> String {
    token(username, crate::now_ms() / 1000 - 1)
}

pub(crate) fn user_json(username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "username": username,
        "email": format!("{username}@universe.app"),
        "first_name": "",
        "last_name": "",
        "is_staff": false,
        "profile": {
            "bio": "",
            "pronouns": "",
            "followers_count": 0,
            "following_count": 0,
            "is_following": false,
            "universidade": "UFPE",
            "curso": "Ciência da Computação",
            "atletica": "",
            "onboarding_complete": true,
            "badges": [],
            "saved_posts": [],
            "is_admin": false,
            "memberships": []
        }
    })
}

/// The backend's side of a mock realtime connection.
pub(crate) struct ServerEnd {
    pub url: String,
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    /// Deliver a text frame to the client. Ignored once the client is gone.
    pub fn push(&self, text: &str) {
        let _ = self.to_client.send(text.to_string());
    }

    /// Make every further client send fail while the connection stays up.
    pub fn stop_accepting(&mut self) {
        self.from_client.close();
    }

    pub async fn next_sent(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.from_client.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client connection gone")
    }
}

/// In-memory realtime connector. Every accepted connection hands its server
/// end to the test; dropping the server end closes the connection.
pub(crate) struct MockConnector {
    servers: mpsc::UnboundedSender<ServerEnd>,
    refusals: AtomicU32,
    refuse_always: AtomicBool,
    attempts: AtomicU32,
}

impl MockConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerEnd>) {
        let (servers, rx) = mpsc::unbounded_channel();
        let connector = Self {
            servers,
            refusals: AtomicU32::new(0),
            refuse_always: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
        };
        (connector, rx)
    }

    pub fn refuse_next(&self, n: u32) {
        self.refusals.store(n, Ordering::SeqCst);
    }

    pub fn refuse_always(&self) {
        self.refuse_always.store(true, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockConnection {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

impl ChannelConnector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, url: &Url) -> Result<MockConnection, ChatError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let refused = self.refuse_always.load(Ordering::SeqCst)
            || self
                .refusals
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if refused {
            return Err(ChatError::Socket("connection refused".to_string()));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let _ = self.servers.send(ServerEnd {
            url: url.to_string(),
            to_client,
            from_client,
        });
        Ok(MockConnection { inbound, outbound })
    }
}

impl ChannelConnection for MockConnection {
    async fn send_text(&mut self, text: String) -> Result<(), ChatError> {
        self.outbound
            .send(text)
            .map_err(|_| ChatError::Socket("peer gone".to_string()))
    }

    async fn recv_text(&mut self) -> Option<Result<String, ChatError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.inbound.close();
    }
}

/// Access token source that always answers the same way.
pub(crate) struct StaticToken {
    token: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn none() -> Self {
        Self {
            token: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<Option<SecretString>, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone().map(SecretString::from))
    }
}
