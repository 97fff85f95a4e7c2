//! Backend reachability check.
//!
//! The hosted backend sleeps when idle and the first call after that can take
//! most of a minute, so the CLI checks `/api/status/` before logging in.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::gate::RequestGate;
use crate::storage::KvStore;
use crate::transport::{ApiRequest, HttpTransport};

pub const STATUS_PATH: &str = "/api/status/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub online: bool,
    /// Round trip of the check, including any wake-up delay.
    #[serde(rename = "latency_ms", serialize_with = "as_millis")]
    pub latency: Duration,
    /// Why the check failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn as_millis<S: serde::Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(latency.as_millis() as u64)
}

pub struct ServerService<T, S> {
    gate: RequestGate<T, S>,
}

impl<T: HttpTransport, S: KvStore> ServerService<T, S> {
    pub fn new(gate: RequestGate<T, S>) -> Self {
        Self { gate }
    }

    /// Ping the backend without credentials. Any failure, including a
    /// non-success status, reports the server offline.
    pub async fn check(&self) -> ServerStatus {
        let started = Instant::now();
        let result = self
            .gate
            .send(ApiRequest::get(STATUS_PATH).unauthenticated())
            .await;
        let latency = started.elapsed();
        match result {
            Ok(_) => {
                debug!(latency_ms = latency.as_millis() as u64, "backend online");
                ServerStatus {
                    online: true,
                    latency,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "backend status check failed");
                ServerStatus {
                    online: false,
                    latency,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
