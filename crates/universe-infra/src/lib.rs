//! Infrastructure layer for UniVerse.
//!
//! Contains implementations of the ports defined in `universe-core`: the
//! reqwest HTTP transport, the tokio-tungstenite chat connector, and the
//! file and OS keychain key-value stores. Also owns config loading and data
//! directory resolution.

pub mod config;
pub mod filesystem;
pub mod http;
pub mod storage;
pub mod ws;
