//! Client-side business logic for UniVerse.
//!
//! This crate defines the ports (transport, storage, realtime connector) that
//! the infrastructure layer implements, and the services built on them: the
//! session manager, the outbound request gate, the realtime chat channel and
//! the REST resource services. It depends only on `universe-types`, never on
//! `universe-infra` or any HTTP/WebSocket/keychain crate.

pub mod capability;
pub mod chat;
pub mod event;
pub mod gate;
pub mod reaction;
pub mod service;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

/// Milliseconds since the Unix epoch, the clock every expiry check uses.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
